//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is an extension trait on [`Router`]:
//!
//! - [`RouterRecoveryExt`] converts panics and request timeouts into error
//!   responses.
//! - [`RouterObservabilityExt`] adds request ids, redacts credentials and
//!   traces requests.
//! - [`RouterOpenApiExt`] serves the OpenAPI document and the Scalar UI.
//!
//! ```rust,no_run
//! use axum::Router;
//! use chirpy_server::middleware::{
//!     RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```
//!
//! [`Router`]: axum::Router

mod observability;
mod recovery;
mod specification;

pub use observability::{RouterObservabilityExt, track_request_metrics};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
