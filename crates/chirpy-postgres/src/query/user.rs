//! User repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NewUser, UpdateUser, User};
use crate::query::RefreshTokenRepository;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Normalizes an email address for storage and lookup.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user database operations.
pub trait UserRepository {
    /// Creates a new user. The email is stored trimmed and lowercased.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Finds a user by id.
    fn find_user_by_id(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by email. Comparison uses the normalized form.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// Returns `None` if the user does not exist.
    fn update_user(
        &mut self,
        user_id: Uuid,
        changes: UpdateUser,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Applies `changes` and revokes every active refresh token of the user
    /// in one transaction, returning the updated user and the number of
    /// revoked tokens.
    ///
    /// Returns `None` without revoking anything if the user does not exist.
    fn update_user_credentials(
        &mut self,
        user_id: Uuid,
        changes: UpdateUser,
        revoked_at: Timestamp,
    ) -> impl Future<Output = PgResult<Option<(User, usize)>>> + Send;

    /// Grants Chirpy Red membership.
    ///
    /// Returns `None` if the user does not exist.
    fn upgrade_user_to_chirpy_red(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Deletes every user, cascading to chirps and refresh tokens.
    fn delete_all_users(&mut self) -> impl Future<Output = PgResult<usize>> + Send;
}

impl UserRepository for PgConnection {
    async fn create_user(&mut self, mut new_user: NewUser) -> PgResult<User> {
        use schema::users;

        new_user.email = normalize_email(&new_user.email);

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_user_by_id(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::id.eq(user_id))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::email.eq(normalize_email(email)))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_user(&mut self, user_id: Uuid, mut changes: UpdateUser) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        if let Some(ref mut email) = changes.email {
            *email = normalize_email(email);
        }
        changes.updated_at = Some(Timestamp::now().into());

        diesel::update(users::table.filter(dsl::id.eq(user_id)))
            .set(&changes)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_user_credentials(
        &mut self,
        user_id: Uuid,
        changes: UpdateUser,
        revoked_at: Timestamp,
    ) -> PgResult<Option<(User, usize)>> {
        self.build_transaction()
            .run(|conn| {
                async move {
                    let Some(user) = conn.update_user(user_id, changes).await? else {
                        return Ok::<_, PgError>(None);
                    };

                    let revoked = conn.revoke_user_refresh_tokens(user_id, revoked_at).await?;
                    Ok(Some((user, revoked)))
                }
                .scope_boxed()
            })
            .await
    }

    async fn upgrade_user_to_chirpy_red(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        let changes = UpdateUser {
            is_chirpy_red: Some(true),
            ..Default::default()
        };

        self.update_user(user_id, changes).await
    }

    async fn delete_all_users(&mut self) -> PgResult<usize> {
        use schema::users;

        let deleted = diesel::delete(users::table)
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::warn!(target: TRACING_TARGET_QUERY, deleted, "deleted all users");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Walt@BreakingBad.com "), "walt@breakingbad.com");
        assert_eq!(normalize_email("saul@bcs.com"), "saul@bcs.com");
    }
}
