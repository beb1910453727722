//! Tracing target constants used for structured logging.
//!
//! Targets are grouped by concern so that subscriber filters such as
//! `RUST_LOG=chirpy_server::authentication=debug` can isolate a subsystem.

/// Login, refresh, revocation and bearer authorization.
pub const TRACING_TARGET_AUTHENTICATION: &str = "chirpy_server::authentication";

/// Session store calls made on behalf of the authenticator.
pub const TRACING_TARGET_SESSION_STORE: &str = "chirpy_server::session_store";

/// Password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "chirpy_server::password_hasher";

/// Session signing key setup.
pub const TRACING_TARGET_SESSION_KEYS: &str = "chirpy_server::session_keys";

/// Request metrics and fileserver hit counting.
pub const TRACING_TARGET_METRICS: &str = "chirpy_server::metrics";

/// Error recovery including middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "chirpy_server::recovery::error";

/// Panic recovery in handlers.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "chirpy_server::recovery::panic";

/// Service configuration and startup checks.
pub const TRACING_TARGET_CONFIG: &str = "chirpy_server::config";

/// Error responses produced by handlers and extractors.
pub const TRACING_TARGET_HTTP_ERROR: &str = "chirpy_server::http_error";

/// Postgres failures surfaced through handlers.
pub const TRACING_TARGET_POSTGRES: &str = "chirpy_server::postgres";
