//! Short-lived signed session tokens.
//!
//! Session tokens are HS256 JWTs. They are never persisted, so they can only
//! be invalidated by expiry or by rotating the server secret. Expiry is
//! checked against an injected instant rather than the wall clock so that
//! validation is a pure function of `(token, keys, now)`.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::security::SessionKeys;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Value of the `iss` claim on every session token.
pub const SESSION_TOKEN_ISSUER: &str = "chirpy";

/// The only accepted signing algorithm.
pub const SESSION_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer, always [`SESSION_TOKEN_ISSUER`].
    pub iss: String,
    /// User the token was issued to.
    pub sub: Uuid,
    /// Random token id, distinguishing tokens minted in the same second.
    pub jti: Uuid,
    /// Issue time, in seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry time, in seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// Builds claims for `user_id` issued at `now` and valid for `ttl`.
    pub fn new(user_id: Uuid, now: Timestamp, ttl: SignedDuration) -> Self {
        let iat = now.as_second();
        Self {
            iss: SESSION_TOKEN_ISSUER.to_owned(),
            sub: user_id,
            jti: Uuid::new_v4(),
            iat,
            exp: iat.saturating_add(ttl.as_secs()),
        }
    }

    /// Returns whether the token is expired at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.as_second() >= self.exp
    }
}

/// Errors produced by the session token codec.
#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    /// The token is unparseable, badly signed, signed with another algorithm
    /// or carries unexpected claims.
    #[error("session token is invalid")]
    Invalid,
    /// The token was valid but its expiry has passed.
    #[error("session token has expired")]
    Expired,
    /// Signing failed.
    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Mints a session token for `user_id`.
pub fn mint(
    user_id: Uuid,
    keys: &SessionKeys,
    now: Timestamp,
    ttl: SignedDuration,
) -> Result<String, SessionTokenError> {
    let claims = SessionClaims::new(user_id, now, ttl);
    encode(
        &Header::new(SESSION_TOKEN_ALGORITHM),
        &claims,
        keys.encoding_key(),
    )
    .map_err(SessionTokenError::Signing)
}

/// Verifies a session token and returns its claims.
pub fn decode_claims(
    token: &str,
    keys: &SessionKeys,
    now: Timestamp,
) -> Result<SessionClaims, SessionTokenError> {
    let claims = decode::<SessionClaims>(token, keys.decoding_key(), &validation())
        .map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                "session token rejected"
            );
            SessionTokenError::Invalid
        })?
        .claims;

    if claims.is_expired_at(now) {
        return Err(SessionTokenError::Expired);
    }

    Ok(claims)
}

/// Verifies a session token and returns the user it was issued to.
pub fn validate(token: &str, keys: &SessionKeys, now: Timestamp) -> Result<Uuid, SessionTokenError> {
    decode_claims(token, keys, now).map(|claims| claims.sub)
}

fn validation() -> Validation {
    let mut validation = Validation::new(SESSION_TOKEN_ALGORITHM);
    // Expiry is compared against the injected clock instead.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_issuer(&[SESSION_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
    validation
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;

    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"a-very-long-session-secret")
    }

    fn epoch() -> Timestamp {
        Timestamp::UNIX_EPOCH + 1_000_000.seconds()
    }

    #[test]
    fn mint_then_validate() -> anyhow::Result<()> {
        let user_id = Uuid::new_v4();
        let token = mint(user_id, &keys(), epoch(), SignedDuration::from_hours(1))?;

        assert_eq!(validate(&token, &keys(), epoch())?, user_id);
        Ok(())
    }

    #[test]
    fn claims_carry_issuer_and_times() -> anyhow::Result<()> {
        let user_id = Uuid::new_v4();
        let token = mint(user_id, &keys(), epoch(), SignedDuration::from_hours(1))?;
        let claims = decode_claims(&token, &keys(), epoch())?;

        assert_eq!(claims.iss, SESSION_TOKEN_ISSUER);
        assert_eq!(claims.iat, epoch().as_second());
        assert_eq!(claims.exp, epoch().as_second() + 3600);
        Ok(())
    }

    #[test]
    fn token_expires_at_exp() -> anyhow::Result<()> {
        let token = mint(Uuid::new_v4(), &keys(), epoch(), SignedDuration::from_secs(10))?;

        assert!(validate(&token, &keys(), epoch() + 9.seconds()).is_ok());
        assert!(matches!(
            validate(&token, &keys(), epoch() + 10.seconds()),
            Err(SessionTokenError::Expired)
        ));
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> anyhow::Result<()> {
        let token = mint(Uuid::new_v4(), &keys(), epoch(), SignedDuration::from_hours(1))?;
        let other = SessionKeys::new(b"another-long-session-secret");

        assert!(matches!(
            validate(&token, &other, epoch()),
            Err(SessionTokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn other_algorithm_is_rejected() -> anyhow::Result<()> {
        let claims = SessionClaims::new(Uuid::new_v4(), epoch(), SignedDuration::from_hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            keys().encoding_key(),
        )?;

        assert!(matches!(
            validate(&token, &keys(), epoch()),
            Err(SessionTokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn foreign_issuer_is_rejected() -> anyhow::Result<()> {
        let mut claims = SessionClaims::new(Uuid::new_v4(), epoch(), SignedDuration::from_hours(1));
        claims.iss = "someone-else".to_owned();
        let token = encode(&Header::new(SESSION_TOKEN_ALGORITHM), &claims, keys().encoding_key())?;

        assert!(matches!(
            validate(&token, &keys(), epoch()),
            Err(SessionTokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn tampered_token_is_rejected() -> anyhow::Result<()> {
        let token = mint(Uuid::new_v4(), &keys(), epoch(), SignedDuration::from_hours(1))?;
        let tampered = format!("{token}x");

        assert!(validate(&tampered, &keys(), epoch()).is_err());
        assert!(validate("not.a.jwt", &keys(), epoch()).is_err());
        Ok(())
    }

    #[test]
    fn mints_in_same_second_differ() -> anyhow::Result<()> {
        let user_id = Uuid::new_v4();
        let first = mint(user_id, &keys(), epoch(), SignedDuration::from_hours(1))?;
        let second = mint(user_id, &keys(), epoch(), SignedDuration::from_hours(1))?;

        assert_ne!(first, second);
        Ok(())
    }
}
