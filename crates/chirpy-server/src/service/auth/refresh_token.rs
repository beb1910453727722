//! Long-lived opaque refresh tokens.
//!
//! A refresh token is 32 random bytes encoded as unpadded base64url. Only its
//! SHA-256 digest is persisted, so a leaked table cannot be replayed.
//!
//! ```text
//! Active --revoke--> Revoked
//! Active --expires_at passes--> Expired
//! ```
//!
//! Both terminal states are derived at read time from `revoked_at` and
//! `expires_at`; no transition leaves them.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chirpy_postgres::model::{NewRefreshToken, RefreshToken};
use jiff::{SignedDuration, Timestamp};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::service::auth::clock::Clock;
use crate::service::auth::config::RefreshRotation;
use crate::service::auth::error::{AuthError, AuthResult};
use crate::service::auth::store::SessionStore;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Shortest remaining lifetime a token may have and still be rotated.
///
/// A replacement inherits the presented token's expiry, so rotating closer
/// to expiry would persist a token that is already dead.
const MIN_ROTATION_LIFETIME: SignedDuration = SignedDuration::from_secs(1);

/// Generates a new opaque refresh token.
pub fn generate_refresh_token() -> String {
    let bytes: [u8; REFRESH_TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Returns the hex-encoded SHA-256 digest under which a token is stored.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// State of a persisted refresh token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl RefreshTokenState {
    /// Derives the state of `record` at `now`. Revocation takes precedence.
    pub fn of(record: &RefreshToken, now: Timestamp) -> Self {
        if record.is_revoked() {
            Self::Revoked
        } else if record.is_expired_at(now) {
            Self::Expired
        } else {
            Self::Active
        }
    }
}

/// A refresh token handed to a client.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    /// The opaque token value. Never logged.
    pub token: String,
    /// Instant after which the token can no longer be renewed.
    pub expires_at: Timestamp,
}

impl fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a successful renewal.
#[derive(Debug, Clone)]
pub struct Renewal {
    /// User the refresh token was issued to.
    pub user_id: Uuid,
    /// Replacement token when the rotation policy issued one.
    pub replacement: Option<IssuedRefreshToken>,
}

/// Issues, renews and revokes refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: SignedDuration,
    rotation: RefreshRotation,
}

impl RefreshTokenManager {
    /// Creates a manager over the given store and clock.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        ttl: SignedDuration,
        rotation: RefreshRotation,
    ) -> Self {
        Self {
            store,
            clock,
            ttl,
            rotation,
        }
    }

    /// Issues and persists a new refresh token for `user_id`.
    pub async fn issue(&self, user_id: Uuid) -> AuthResult<IssuedRefreshToken> {
        let now = self.clock.now();
        let expires_at = now.checked_add(self.ttl)?;
        let token = generate_refresh_token();

        self.store
            .create_refresh_token(NewRefreshToken {
                token_hash: hash_refresh_token(&token),
                user_id,
                created_at: now.into(),
                expires_at: expires_at.into(),
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %user_id,
            expires_at = %expires_at,
            "refresh token issued"
        );

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Checks that `token` is active and applies the renewal policy.
    ///
    /// Under [`RefreshRotation::Rotate`] the presented token is revoked and a
    /// replacement inheriting its expiry is persisted atomically. A token with
    /// less than a second left is reported as expired instead of rotated. If a
    /// concurrent renewal or revocation wins the race, the token is reported
    /// as revoked.
    pub async fn renew(&self, token: &str) -> AuthResult<Renewal> {
        let now = self.clock.now();
        let token_hash = hash_refresh_token(token);

        let record = self
            .store
            .find_refresh_token(&token_hash)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        match RefreshTokenState::of(&record, now) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Expired => return Err(AuthError::RefreshTokenExpired),
            RefreshTokenState::Revoked => return Err(AuthError::RefreshTokenRevoked),
        }

        let user_id = record.user_id;
        if self.rotation == RefreshRotation::Reuse {
            return Ok(Renewal {
                user_id,
                replacement: None,
            });
        }

        let expires_at = record.expires_at();
        if now.duration_until(expires_at) < MIN_ROTATION_LIFETIME {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                user_id = %user_id,
                expires_at = %expires_at,
                "refresh token too close to expiry to rotate"
            );
            return Err(AuthError::RefreshTokenExpired);
        }

        let replacement = IssuedRefreshToken {
            token: generate_refresh_token(),
            expires_at,
        };

        let rotated = self
            .store
            .rotate_refresh_token(
                &token_hash,
                now,
                NewRefreshToken {
                    token_hash: hash_refresh_token(&replacement.token),
                    user_id,
                    created_at: now.into(),
                    expires_at: replacement.expires_at.into(),
                },
            )
            .await?;

        if rotated.is_none() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                user_id = %user_id,
                "refresh token was consumed concurrently"
            );
            return Err(AuthError::RefreshTokenRevoked);
        }

        Ok(Renewal {
            user_id,
            replacement: Some(replacement),
        })
    }

    /// Revokes `token`. Unknown and already revoked tokens are accepted.
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let revoked = self
            .store
            .revoke_refresh_token(&hash_refresh_token(token), self.clock.now())
            .await?;

        if !revoked {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                "revocation of unknown or already revoked refresh token"
            );
        }

        Ok(())
    }
}

impl fmt::Debug for RefreshTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenManager")
            .field("ttl", &self.ttl)
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;

    use super::*;
    use crate::service::auth::clock::ManualClock;
    use crate::service::auth::store::MemorySessionStore;

    struct Fixture {
        store: Arc<MemorySessionStore>,
        clock: Arc<ManualClock>,
        manager: RefreshTokenManager,
    }

    fn fixture(rotation: RefreshRotation) -> Fixture {
        let store = Arc::new(MemorySessionStore::default());
        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH + 1_000_000.seconds()));
        let manager = RefreshTokenManager::new(
            store.clone(),
            clock.clone(),
            SignedDuration::from_hours(24),
            rotation,
        );

        Fixture {
            store,
            clock,
            manager,
        }
    }

    #[test]
    fn generated_tokens_are_url_safe_and_unique() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();

        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = hash_refresh_token("token");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_refresh_token("token"));
        assert_ne!(digest, hash_refresh_token("other"));
    }

    #[tokio::test]
    async fn issue_persists_digest_only() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let user_id = Uuid::new_v4();
        let issued = fx.manager.issue(user_id).await?;

        let record = fx
            .store
            .refresh_token(&hash_refresh_token(&issued.token))
            .expect("record stored under digest");
        assert_eq!(record.user_id, user_id);
        assert!(fx.store.refresh_token(&issued.token).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn reuse_keeps_token_valid() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Reuse);
        let user_id = Uuid::new_v4();
        let issued = fx.manager.issue(user_id).await?;

        let first = fx.manager.renew(&issued.token).await?;
        let second = fx.manager.renew(&issued.token).await?;

        assert_eq!(first.user_id, user_id);
        assert!(first.replacement.is_none());
        assert_eq!(second.user_id, user_id);
        Ok(())
    }

    #[tokio::test]
    async fn rotate_revokes_presented_token() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let user_id = Uuid::new_v4();
        let issued = fx.manager.issue(user_id).await?;

        let renewal = fx.manager.renew(&issued.token).await?;
        let replacement = renewal.replacement.expect("rotation issues a replacement");
        assert_eq!(replacement.expires_at, issued.expires_at);

        assert!(matches!(
            fx.manager.renew(&issued.token).await,
            Err(AuthError::RefreshTokenRevoked)
        ));
        assert_eq!(fx.manager.renew(&replacement.token).await?.user_id, user_id);
        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_cannot_renew() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let issued = fx.manager.issue(Uuid::new_v4()).await?;

        fx.manager.revoke(&issued.token).await?;
        fx.manager.revoke(&issued.token).await?;

        assert!(matches!(
            fx.manager.renew(&issued.token).await,
            Err(AuthError::RefreshTokenRevoked)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_cannot_renew() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let issued = fx.manager.issue(Uuid::new_v4()).await?;

        fx.clock
            .advance(SignedDuration::from_hours(24) - MIN_ROTATION_LIFETIME);
        assert!(fx.manager.renew(&issued.token).await.is_ok());

        let issued = fx.manager.issue(Uuid::new_v4()).await?;
        fx.clock.advance(SignedDuration::from_hours(24) + SignedDuration::from_secs(1));
        assert!(matches!(
            fx.manager.renew(&issued.token).await,
            Err(AuthError::RefreshTokenExpired)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn rotation_at_expiry_instant_is_expired() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let issued = fx.manager.issue(Uuid::new_v4()).await?;

        fx.clock.set(issued.expires_at);
        assert!(matches!(
            fx.manager.renew(&issued.token).await,
            Err(AuthError::RefreshTokenExpired)
        ));

        // Nothing was revoked or inserted.
        let record = fx
            .store
            .refresh_token(&hash_refresh_token(&issued.token))
            .expect("record stored under digest");
        assert!(!record.is_revoked());
        Ok(())
    }

    #[tokio::test]
    async fn rotation_just_before_expiry_succeeds() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Rotate);
        let issued = fx.manager.issue(Uuid::new_v4()).await?;

        fx.clock.set(issued.expires_at - SignedDuration::from_secs(1));
        let renewal = fx.manager.renew(&issued.token).await?;
        let replacement = renewal.replacement.expect("rotation issues a replacement");

        let record = fx
            .store
            .refresh_token(&hash_refresh_token(&replacement.token))
            .expect("replacement stored under digest");
        assert!(record.expires_at() > jiff::Timestamp::from(record.created_at));
        Ok(())
    }

    #[tokio::test]
    async fn reuse_is_allowed_until_expiry_instant() -> anyhow::Result<()> {
        let fx = fixture(RefreshRotation::Reuse);
        let issued = fx.manager.issue(Uuid::new_v4()).await?;

        fx.clock.set(issued.expires_at);
        assert!(fx.manager.renew(&issued.token).await?.replacement.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let fx = fixture(RefreshRotation::Rotate);

        assert!(matches!(
            fx.manager.renew("unknown").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
        assert!(fx.manager.revoke("unknown").await.is_ok());
    }
}
