//! Request types for HTTP handlers.

mod authentications;
mod chirps;
mod users;
mod webhooks;

pub use authentications::*;
pub use chirps::*;
pub use users::*;
pub use webhooks::*;
