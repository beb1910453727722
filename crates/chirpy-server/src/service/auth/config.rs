//! Authentication configuration.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// What happens to a refresh token when it is used to renew a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefreshRotation {
    /// The presented token is revoked and a replacement is issued.
    #[default]
    Rotate,
    /// The presented token stays valid until it expires or is revoked.
    Reuse,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct AuthConfig {
    /// Lifetime of session tokens, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SESSION_TTL_SECS", default_value_t = 3600)
    )]
    pub session_ttl_secs: u64,

    /// Lifetime of refresh tokens, in days.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REFRESH_TTL_DAYS", default_value_t = 60)
    )]
    pub refresh_ttl_days: u64,

    /// Whether renewing a session rotates the refresh token.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REFRESH_ROTATION", value_enum, default_value_t = RefreshRotation::Rotate)
    )]
    pub refresh_rotation: RefreshRotation,

    /// Deadline for a single session store call, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 5)
    )]
    pub store_timeout_secs: u64,

    /// Argon2 memory cost, in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_MEMORY_KIB", default_value_t = 19 * 1024)
    )]
    pub password_memory_kib: u32,

    /// Argon2 iteration count.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_ITERATIONS", default_value_t = 2)
    )]
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            refresh_ttl_days: 60,
            refresh_rotation: RefreshRotation::default(),
            store_timeout_secs: 5,
            password_memory_kib: 19 * 1024,
            password_iterations: 2,
        }
    }
}

impl AuthConfig {
    /// Upper bound of the session token lifetime.
    pub const MAX_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
    /// Upper bound of the refresh token lifetime.
    pub const MAX_REFRESH_TTL_DAYS: u64 = 365;

    /// Validates the configured bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.session_ttl_secs == 0 || self.session_ttl_secs > Self::MAX_SESSION_TTL_SECS {
            return Err(format!(
                "session ttl must be between 1 and {} seconds",
                Self::MAX_SESSION_TTL_SECS
            ));
        }

        if self.refresh_ttl_days == 0 || self.refresh_ttl_days > Self::MAX_REFRESH_TTL_DAYS {
            return Err(format!(
                "refresh ttl must be between 1 and {} days",
                Self::MAX_REFRESH_TTL_DAYS
            ));
        }

        if self.store_timeout_secs == 0 {
            return Err("store timeout must be greater than zero".to_owned());
        }

        Ok(())
    }

    /// Returns the session token lifetime.
    pub fn session_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.session_ttl_secs.min(Self::MAX_SESSION_TTL_SECS) as i64)
    }

    /// Returns the refresh token lifetime.
    pub fn refresh_ttl(&self) -> SignedDuration {
        let days = self.refresh_ttl_days.min(Self::MAX_REFRESH_TTL_DAYS) as i64;
        SignedDuration::from_hours(days * 24)
    }

    /// Returns the session store call deadline.
    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.store_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl(), SignedDuration::from_hours(1));
        assert_eq!(config.refresh_ttl(), SignedDuration::from_hours(60 * 24));
        assert_eq!(config.refresh_rotation, RefreshRotation::Rotate);
    }

    #[test]
    fn out_of_range_ttls_are_rejected() {
        let config = AuthConfig {
            session_ttl_secs: 0,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AuthConfig {
            refresh_ttl_days: 400,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rotation_parses_from_str() {
        assert_eq!("reuse".parse::<RefreshRotation>().ok(), Some(RefreshRotation::Reuse));
        assert_eq!(RefreshRotation::Rotate.to_string(), "rotate");
    }
}
