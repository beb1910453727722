//! Database models for all tables.
//!
//! Each table has a queryable model, an insertable `New*` struct and, where
//! rows are mutable, an `Update*` changeset.

mod chirp;
mod refresh_token;
mod user;

pub use chirp::{Chirp, NewChirp};
pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use user::{NewUser, UpdateUser, User};
