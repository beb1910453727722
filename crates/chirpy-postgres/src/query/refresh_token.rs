//! Refresh token repository.
//!
//! Revocation and rotation are conditional updates, so concurrent requests
//! racing on the same token are resolved by the database rather than by
//! in-process locking.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NewRefreshToken, RefreshToken};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for refresh token database operations.
pub trait RefreshTokenRepository {
    /// Persists a newly issued refresh token.
    fn create_refresh_token(
        &mut self,
        new_token: NewRefreshToken,
    ) -> impl Future<Output = PgResult<RefreshToken>> + Send;

    /// Finds a refresh token by its digest, regardless of state.
    fn find_refresh_token(
        &mut self,
        token_hash: &str,
    ) -> impl Future<Output = PgResult<Option<RefreshToken>>> + Send;

    /// Sets `revoked_at` on a token that is not already revoked.
    ///
    /// Returns `false` if the token is unknown or was already revoked.
    fn revoke_refresh_token(
        &mut self,
        token_hash: &str,
        revoked_at: Timestamp,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Revokes an active token and stores its replacement in one transaction.
    ///
    /// Returns `None` without inserting anything if the old token is unknown,
    /// revoked or expired at `now`.
    fn rotate_refresh_token(
        &mut self,
        token_hash: &str,
        now: Timestamp,
        replacement: NewRefreshToken,
    ) -> impl Future<Output = PgResult<Option<RefreshToken>>> + Send;

    /// Revokes every active token of a user, returning how many were revoked.
    fn revoke_user_refresh_tokens(
        &mut self,
        user_id: Uuid,
        revoked_at: Timestamp,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl RefreshTokenRepository for PgConnection {
    async fn create_refresh_token(&mut self, new_token: NewRefreshToken) -> PgResult<RefreshToken> {
        use schema::refresh_tokens;

        diesel::insert_into(refresh_tokens::table)
            .values(&new_token)
            .returning(RefreshToken::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_refresh_token(&mut self, token_hash: &str) -> PgResult<Option<RefreshToken>> {
        use schema::refresh_tokens::{self, dsl};

        refresh_tokens::table
            .filter(dsl::token_hash.eq(token_hash))
            .select(RefreshToken::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn revoke_refresh_token(&mut self, token_hash: &str, revoked_at: Timestamp) -> PgResult<bool> {
        use schema::refresh_tokens::{self, dsl};

        let revoked_at = jiff_diesel::Timestamp::from(revoked_at);
        let updated = diesel::update(refresh_tokens::table)
            .filter(dsl::token_hash.eq(token_hash))
            .filter(dsl::revoked_at.is_null())
            .set((dsl::revoked_at.eq(Some(revoked_at)), dsl::updated_at.eq(revoked_at)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(updated > 0)
    }

    async fn rotate_refresh_token(
        &mut self,
        token_hash: &str,
        now: Timestamp,
        replacement: NewRefreshToken,
    ) -> PgResult<Option<RefreshToken>> {
        use schema::refresh_tokens::{self, dsl};

        let token_hash = token_hash.to_owned();
        let now = jiff_diesel::Timestamp::from(now);

        self.build_transaction()
            .run(|conn| {
                async move {
                    let revoked = diesel::update(refresh_tokens::table)
                        .filter(dsl::token_hash.eq(&token_hash))
                        .filter(dsl::revoked_at.is_null())
                        .filter(dsl::expires_at.ge(now))
                        .set((dsl::revoked_at.eq(Some(now)), dsl::updated_at.eq(now)))
                        .execute(conn)
                        .await?;

                    if revoked == 0 {
                        return Ok::<_, PgError>(None);
                    }

                    let token = diesel::insert_into(refresh_tokens::table)
                        .values(&replacement)
                        .returning(RefreshToken::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok(Some(token))
                }
                .scope_boxed()
            })
            .await
    }

    async fn revoke_user_refresh_tokens(&mut self, user_id: Uuid, revoked_at: Timestamp) -> PgResult<usize> {
        use schema::refresh_tokens::{self, dsl};

        let revoked_at = jiff_diesel::Timestamp::from(revoked_at);
        let revoked = diesel::update(refresh_tokens::table)
            .filter(dsl::user_id.eq(user_id))
            .filter(dsl::revoked_at.is_null())
            .set((dsl::revoked_at.eq(Some(revoked_at)), dsl::updated_at.eq(revoked_at)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user_id,
            revoked,
            "revoked refresh tokens of user"
        );

        Ok(revoked)
    }
}
