//! Login, refresh, revocation and request authorization flows.

use std::fmt;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::service::auth::clock::Clock;
use crate::service::auth::config::AuthConfig;
use crate::service::auth::error::{AuthError, AuthResult};
use crate::service::auth::refresh_token::{IssuedRefreshToken, RefreshTokenManager};
use crate::service::auth::session_token;
use crate::service::auth::store::{SessionStore, StoredCredential, UserProfile};
use crate::service::security::{PasswordError, PasswordHasher, SessionKeys};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: UserProfile,
    pub session_token: String,
    pub refresh_token: IssuedRefreshToken,
}

/// Tokens handed out by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub user_id: Uuid,
    pub session_token: String,
    /// Present when the refresh token was rotated.
    pub refresh_token: Option<IssuedRefreshToken>,
}

/// Composes password verification, session tokens and refresh tokens.
///
/// Cheap to clone; all state lives behind an [`Arc`].
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<AuthenticatorInner>,
}

struct AuthenticatorInner {
    store: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    keys: SessionKeys,
    clock: Arc<dyn Clock>,
    session_ttl: SignedDuration,
    refresh_tokens: RefreshTokenManager,
}

impl Authenticator {
    /// Creates an authenticator from its collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
        keys: SessionKeys,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        let refresh_tokens = RefreshTokenManager::new(
            store.clone(),
            clock.clone(),
            config.refresh_ttl(),
            config.refresh_rotation,
        );

        let inner = AuthenticatorInner {
            store,
            hasher,
            keys,
            clock,
            session_ttl: config.session_ttl(),
            refresh_tokens,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Verifies `email` and `password` and issues a session and a refresh token.
    ///
    /// `requested_ttl` shortens the session token lifetime; it is clamped to
    /// the configured maximum and ignored when not positive. Unknown emails
    /// still pay for one hash verification, and every failure is reported
    /// as [`AuthError::InvalidCredentials`].
    #[tracing::instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<SignedDuration>,
    ) -> AuthResult<LoginSession> {
        let hasher = &self.inner.hasher;

        let Some(credential) = self.inner.store.find_credential_by_email(email).await? else {
            hasher.spawn_verify_dummy_password(password.to_owned()).await;
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                "login rejected: unknown email"
            );
            return Err(AuthError::InvalidCredentials);
        };

        let StoredCredential {
            profile,
            hashed_password,
        } = credential;

        match hasher
            .spawn_verify_password(password.to_owned(), hashed_password)
            .await
        {
            Ok(()) => {}
            Err(PasswordError::Mismatch | PasswordError::MalformedHash | PasswordError::EmptyPassword) => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    user_id = %profile.id,
                    "login rejected: password mismatch"
                );
                return Err(AuthError::InvalidCredentials);
            }
            Err(error) => return Err(error.into()),
        }

        let user_id = profile.id;
        let ttl = self.clamp_session_ttl(requested_ttl);
        let session_token = self.mint_session_token(user_id, ttl)?;
        let refresh_token = self.inner.refresh_tokens.issue(user_id).await?;

        tracing::info!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %user_id,
            session_ttl_secs = ttl.as_secs(),
            "user logged in"
        );

        Ok(LoginSession {
            user: profile,
            session_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new session token.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedSession> {
        let renewal = self.inner.refresh_tokens.renew(refresh_token).await?;
        let session_token = self.mint_session_token(renewal.user_id, self.inner.session_ttl)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %renewal.user_id,
            rotated = renewal.replacement.is_some(),
            "session refreshed"
        );

        Ok(RefreshedSession {
            user_id: renewal.user_id,
            session_token,
            refresh_token: renewal.replacement,
        })
    }

    /// Revokes a refresh token. Unknown tokens are not an error.
    #[tracing::instrument(skip_all)]
    pub async fn revoke(&self, refresh_token: &str) -> AuthResult<()> {
        self.inner.refresh_tokens.revoke(refresh_token).await
    }

    /// Validates a session token and returns the acting user.
    pub fn authorize(&self, session_token: &str) -> AuthResult<Uuid> {
        let now = self.inner.clock.now();
        session_token::validate(session_token, &self.inner.keys, now).map_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "session token rejected"
            );
            AuthError::from(error)
        })
    }

    /// Issues a refresh token for `user_id` outside of a login.
    pub async fn issue_refresh_token(&self, user_id: Uuid) -> AuthResult<IssuedRefreshToken> {
        self.inner.refresh_tokens.issue(user_id).await
    }

    /// Mints a session token for `user_id` valid for `ttl`.
    pub fn mint_session_token(&self, user_id: Uuid, ttl: SignedDuration) -> AuthResult<String> {
        let now = self.inner.clock.now();
        session_token::mint(user_id, &self.inner.keys, now, ttl).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "failed to sign session token"
            );
            AuthError::from(error)
        })
    }

    /// Hashes a password for storage.
    pub async fn hash_password(&self, password: &str) -> AuthResult<String> {
        Ok(self.inner.hasher.spawn_hash_password(password.to_owned()).await?)
    }

    /// Returns the current instant of the injected clock.
    #[inline]
    pub fn now(&self) -> Timestamp {
        self.inner.clock.now()
    }

    fn clamp_session_ttl(&self, requested: Option<SignedDuration>) -> SignedDuration {
        let max = self.inner.session_ttl;
        requested
            .filter(|ttl| ttl.is_positive())
            .map_or(max, |ttl| ttl.min(max))
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("session_ttl", &self.inner.session_ttl)
            .field("refresh_tokens", &self.inner.refresh_tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use jiff::{Timestamp, ToSpan};

    use super::*;
    use crate::service::auth::clock::ManualClock;
    use crate::service::auth::store::MemorySessionStore;
    use crate::service::security::test_hasher;

    pub(crate) const TEST_SECRET: &[u8] = b"a-very-long-session-secret";

    pub(crate) struct TestAuth {
        pub(crate) authenticator: Authenticator,
        pub(crate) store: Arc<MemorySessionStore>,
        pub(crate) clock: Arc<ManualClock>,
    }

    impl TestAuth {
        pub(crate) fn new(config: &AuthConfig) -> Self {
            let store = Arc::new(MemorySessionStore::default());
            let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH + 1_000_000.seconds()));
            let authenticator = Authenticator::new(
                store.clone(),
                test_hasher(),
                SessionKeys::new(TEST_SECRET),
                clock.clone(),
                config,
            );

            Self {
                authenticator,
                store,
                clock,
            }
        }

        /// Registers a user directly in the store and returns its id.
        pub(crate) fn register(&self, email: &str, password: &str) -> Uuid {
            let hash = test_hasher()
                .hash_password(password)
                .expect("hashable test password");
            self.store.insert_user(email, hash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{TEST_SECRET, TestAuth};
    use super::*;
    use crate::service::auth::config::RefreshRotation;
    use crate::service::auth::session_token::SessionTokenError;

    #[tokio::test]
    async fn login_refresh_revoke_scenario() -> anyhow::Result<()> {
        let auth = TestAuth::new(&AuthConfig::default());
        let user_id = auth.register("walt@breakingbad.com", "123456");

        let login = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", None)
            .await?;
        assert_eq!(login.user.id, user_id);
        assert_eq!(login.user.email, "walt@breakingbad.com");
        assert_eq!(auth.authenticator.authorize(&login.session_token)?, user_id);

        let refreshed = auth.authenticator.refresh(&login.refresh_token.token).await?;
        assert_eq!(auth.authenticator.authorize(&refreshed.session_token)?, user_id);

        let rotated = refreshed.refresh_token.expect("rotation is the default");
        auth.authenticator.revoke(&rotated.token).await?;

        let error = auth.authenticator.refresh(&rotated.token).await.err();
        assert!(matches!(error, Some(AuthError::RefreshTokenRevoked)));
        Ok(())
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let auth = TestAuth::new(&AuthConfig::default());
        auth.register("walt@breakingbad.com", "123456");

        let wrong_password = auth
            .authenticator
            .login("walt@breakingbad.com", "654321", None)
            .await;
        let unknown_email = auth
            .authenticator
            .login("saul@bettercall.com", "123456", None)
            .await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn foreign_password_hash_rejects_login() {
        let auth = TestAuth::new(&AuthConfig::default());
        auth.store.insert_user(
            "walt@breakingbad.com",
            "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA".to_owned(),
        );

        let error = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", None)
            .await
            .err();

        assert!(matches!(error, Some(AuthError::InvalidCredentials)));
        assert!(error.is_some_and(|error| error.is_unauthorized()));
    }

    #[tokio::test]
    async fn hashed_password_logs_in() -> anyhow::Result<()> {
        let auth = TestAuth::new(&AuthConfig::default());
        let hash = auth.authenticator.hash_password("123456").await?;
        auth.store.insert_user("walt@breakingbad.com", hash);

        let login = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", None)
            .await?;
        assert_eq!(login.user.email, "walt@breakingbad.com");

        let error = auth.authenticator.hash_password("").await.err();
        assert!(matches!(
            error,
            Some(AuthError::Password(PasswordError::EmptyPassword))
        ));
        Ok(())
    }

    #[test]
    fn now_follows_injected_clock() {
        let auth = TestAuth::new(&AuthConfig::default());
        let before = auth.authenticator.now();

        auth.clock.advance(SignedDuration::from_secs(90));
        assert_eq!(
            auth.authenticator.now(),
            before + SignedDuration::from_secs(90)
        );
    }

    #[tokio::test]
    async fn requested_ttl_is_clamped() -> anyhow::Result<()> {
        let auth = TestAuth::new(&AuthConfig::default());
        auth.register("walt@breakingbad.com", "123456");
        let keys = SessionKeys::new(TEST_SECRET);
        let now = auth.clock.now();

        let short = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", Some(SignedDuration::from_secs(60)))
            .await?;
        let claims = session_token::decode_claims(&short.session_token, &keys, now)?;
        assert_eq!(claims.exp - claims.iat, 60);

        let long = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", Some(SignedDuration::from_hours(48)))
            .await?;
        let claims = session_token::decode_claims(&long.session_token, &keys, now)?;
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[tokio::test]
    async fn session_token_expires_with_clock() -> anyhow::Result<()> {
        let auth = TestAuth::new(&AuthConfig::default());
        auth.register("walt@breakingbad.com", "123456");

        let login = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", None)
            .await?;
        auth.clock.advance(SignedDuration::from_hours(1));

        let error = auth.authenticator.authorize(&login.session_token).err();
        assert!(matches!(
            error,
            Some(AuthError::SessionToken(SessionTokenError::Expired))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn reuse_policy_returns_no_replacement() -> anyhow::Result<()> {
        let config = AuthConfig {
            refresh_rotation: RefreshRotation::Reuse,
            ..AuthConfig::default()
        };
        let auth = TestAuth::new(&config);
        auth.register("walt@breakingbad.com", "123456");

        let login = auth
            .authenticator
            .login("walt@breakingbad.com", "123456", None)
            .await?;
        let refreshed = auth.authenticator.refresh(&login.refresh_token.token).await?;

        assert!(refreshed.refresh_token.is_none());
        assert!(auth.authenticator.refresh(&login.refresh_token.token).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected() -> anyhow::Result<()> {
        let auth = TestAuth::new(&AuthConfig::default());
        let user_id = auth.register("walt@breakingbad.com", "123456");

        let issued = auth.authenticator.issue_refresh_token(user_id).await?;
        auth.clock
            .advance(AuthConfig::default().refresh_ttl() + SignedDuration::from_secs(1));

        let error = auth.authenticator.refresh(&issued.token).await.err();
        assert!(matches!(error, Some(AuthError::RefreshTokenExpired)));
        Ok(())
    }
}
