//! Repository traits implemented on [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

mod chirp;
mod refresh_token;
mod user;

pub use chirp::{ChirpFilter, ChirpRepository};
pub use refresh_token::RefreshTokenRepository;
pub use user::UserRepository;
