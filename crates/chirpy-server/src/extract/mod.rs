//! HTTP request extractors.
//!
//! # Authentication
//!
//! - [`AuthState`] validates a bearer session token and yields the acting user.
//! - [`BearerToken`] yields the raw bearer credential (refresh tokens).
//! - [`ApiKey`] yields the raw `ApiKey` credential.
//! - [`WebhookAuth`] checks that credential against the configured webhook key.
//!
//! # Request data
//!
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] wrap their axum
//!   counterparts and turn rejections into the crate's error envelope.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{ApiKey, AuthState, BearerToken, WebhookAuth};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
