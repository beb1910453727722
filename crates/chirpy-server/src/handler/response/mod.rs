//! Response types for HTTP handlers.

mod authentications;
mod chirps;
mod errors;
mod users;

pub use authentications::*;
pub use chirps::*;
pub use errors::*;
pub use users::*;
