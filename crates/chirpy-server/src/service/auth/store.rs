//! Persistence seam of the authentication core.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chirpy_postgres::model::{NewRefreshToken, RefreshToken, User};
use chirpy_postgres::query::{RefreshTokenRepository, UserRepository};
use chirpy_postgres::{PgClient, PgError, PgResult};
use jiff::Timestamp;
use uuid::Uuid;

use crate::service::auth::error::{AuthError, AuthResult};
use crate::utility::tracing_targets::TRACING_TARGET_SESSION_STORE;

/// Public attributes of a user, handed back to the client on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub is_chirpy_red: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Password hash bound to a user, as fetched for login.
#[derive(Clone)]
pub struct StoredCredential {
    pub profile: UserProfile,
    pub hashed_password: String,
}

impl StoredCredential {
    #[inline]
    pub fn user_id(&self) -> Uuid {
        self.profile.id
    }
}

impl From<User> for StoredCredential {
    fn from(user: User) -> Self {
        Self {
            profile: UserProfile {
                id: user.id,
                created_at: user.created_at(),
                updated_at: user.updated_at(),
                email: user.email,
                is_chirpy_red: user.is_chirpy_red,
            },
            hashed_password: user.hashed_password,
        }
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Store operations the authentication core depends on.
///
/// Revocation and rotation must be atomic at the store level, since several
/// server processes may share one store.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Finds the credential of the user with `email`.
    async fn find_credential_by_email(&self, email: &str) -> AuthResult<Option<StoredCredential>>;

    /// Persists a newly issued refresh token.
    async fn create_refresh_token(&self, new_token: NewRefreshToken) -> AuthResult<RefreshToken>;

    /// Finds a refresh token by digest.
    async fn find_refresh_token(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Revokes a token that is not yet revoked. Returns whether a row changed.
    async fn revoke_refresh_token(&self, token_hash: &str, revoked_at: Timestamp) -> AuthResult<bool>;

    /// Revokes an active token and persists its replacement in one step.
    ///
    /// Returns `None` if the token was no longer active at `now`.
    async fn rotate_refresh_token(
        &self,
        token_hash: &str,
        now: Timestamp,
        replacement: NewRefreshToken,
    ) -> AuthResult<Option<RefreshToken>>;
}

/// [`SessionStore`] backed by PostgreSQL, with a deadline on every call.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    client: PgClient,
    timeout: Duration,
}

impl PgSessionStore {
    /// Creates a store over `client` whose calls fail after `timeout`.
    pub fn new(client: PgClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> AuthResult<T>
    where
        F: Future<Output = PgResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result.map_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET_SESSION_STORE,
                    operation,
                    error = %error,
                    "session store call failed"
                );
                AuthError::Store(error)
            }),
            Err(_) => {
                tracing::error!(
                    target: TRACING_TARGET_SESSION_STORE,
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "session store call timed out"
                );
                Err(AuthError::StoreTimeout(operation))
            }
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_credential_by_email(&self, email: &str) -> AuthResult<Option<StoredCredential>> {
        self.bounded("find_credential_by_email", async {
            let mut conn = self.client.get_connection().await?;
            let user = conn.find_user_by_email(email).await?;
            Ok::<_, PgError>(user.map(StoredCredential::from))
        })
        .await
    }

    async fn create_refresh_token(&self, new_token: NewRefreshToken) -> AuthResult<RefreshToken> {
        self.bounded("create_refresh_token", async {
            let mut conn = self.client.get_connection().await?;
            conn.create_refresh_token(new_token).await
        })
        .await
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        self.bounded("find_refresh_token", async {
            let mut conn = self.client.get_connection().await?;
            conn.find_refresh_token(token_hash).await
        })
        .await
    }

    async fn revoke_refresh_token(&self, token_hash: &str, revoked_at: Timestamp) -> AuthResult<bool> {
        self.bounded("revoke_refresh_token", async {
            let mut conn = self.client.get_connection().await?;
            conn.revoke_refresh_token(token_hash, revoked_at).await
        })
        .await
    }

    async fn rotate_refresh_token(
        &self,
        token_hash: &str,
        now: Timestamp,
        replacement: NewRefreshToken,
    ) -> AuthResult<Option<RefreshToken>> {
        self.bounded("rotate_refresh_token", async {
            let mut conn = self.client.get_connection().await?;
            conn.rotate_refresh_token(token_hash, now, replacement).await
        })
        .await
    }
}

#[cfg(test)]
pub(crate) use memory::MemorySessionStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory [`SessionStore`] for tests.
    #[derive(Debug, Default)]
    pub(crate) struct MemorySessionStore {
        users: Mutex<HashMap<String, StoredCredential>>,
        tokens: Mutex<HashMap<String, RefreshToken>>,
    }

    impl MemorySessionStore {
        pub(crate) fn insert_user(&self, email: &str, hashed_password: String) -> Uuid {
            let email = email.trim().to_lowercase();
            let now = Timestamp::now();
            let profile = UserProfile {
                id: Uuid::new_v4(),
                email: email.clone(),
                is_chirpy_red: false,
                created_at: now,
                updated_at: now,
            };

            let user_id = profile.id;
            self.users.lock().expect("poisoned").insert(
                email,
                StoredCredential {
                    profile,
                    hashed_password,
                },
            );
            user_id
        }

        pub(crate) fn refresh_token(&self, token_hash: &str) -> Option<RefreshToken> {
            self.tokens.lock().expect("poisoned").get(token_hash).cloned()
        }

        /// Mirrors the `refresh_tokens_expires_after_created` check constraint.
        fn insert_token(&self, new_token: NewRefreshToken) -> AuthResult<RefreshToken> {
            let created_at = Timestamp::from(new_token.created_at);
            let expires_at = Timestamp::from(new_token.expires_at);
            if expires_at <= created_at {
                return Err(AuthError::Store(PgError::Unexpected(
                    "refresh_tokens_expires_after_created".into(),
                )));
            }

            let record = RefreshToken {
                token_hash: new_token.token_hash,
                user_id: new_token.user_id,
                created_at: new_token.created_at,
                updated_at: new_token.created_at,
                expires_at: new_token.expires_at,
                revoked_at: None,
            };
            self.tokens
                .lock()
                .expect("poisoned")
                .insert(record.token_hash.clone(), record.clone());
            Ok(record)
        }
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
        async fn find_credential_by_email(
            &self,
            email: &str,
        ) -> AuthResult<Option<StoredCredential>> {
            let email = email.trim().to_lowercase();
            Ok(self.users.lock().expect("poisoned").get(&email).cloned())
        }

        async fn create_refresh_token(&self, new_token: NewRefreshToken) -> AuthResult<RefreshToken> {
            self.insert_token(new_token)
        }

        async fn find_refresh_token(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
            Ok(self.refresh_token(token_hash))
        }

        async fn revoke_refresh_token(
            &self,
            token_hash: &str,
            revoked_at: Timestamp,
        ) -> AuthResult<bool> {
            let mut tokens = self.tokens.lock().expect("poisoned");
            match tokens.get_mut(token_hash) {
                Some(record) if record.revoked_at.is_none() => {
                    record.revoked_at = Some(revoked_at.into());
                    record.updated_at = revoked_at.into();
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn rotate_refresh_token(
            &self,
            token_hash: &str,
            now: Timestamp,
            replacement: NewRefreshToken,
        ) -> AuthResult<Option<RefreshToken>> {
            {
                let tokens = self.tokens.lock().expect("poisoned");
                match tokens.get(token_hash) {
                    Some(record) if !record.is_revoked() && !record.is_expired_at(now) => {}
                    _ => return Ok(None),
                }
            }

            // Insert first so a rejected replacement leaves the old token active.
            let token = self.insert_token(replacement)?;
            if let Some(record) = self.tokens.lock().expect("poisoned").get_mut(token_hash) {
                record.revoked_at = Some(now.into());
                record.updated_at = now.into();
            }

            Ok(Some(token))
        }
    }
}
