//! User registration and account updates.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use chirpy_postgres::PgClient;
use chirpy_postgres::model::{NewUser, UpdateUser as UserChanges};
use chirpy_postgres::query::UserRepository;

use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::request::{CreateUser, UpdateUser};
use crate::handler::response::{ErrorResponse, User};
use crate::handler::{ErrorKind, Result};
use crate::service::{Authenticator, PasswordHasher, ServiceState};

/// Tracing target for user operations.
const TRACING_TARGET: &str = "chirpy_server::handler::users";

/// Registers a new user.
#[tracing::instrument(skip_all)]
async fn create_user(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    ValidateJson(request): ValidateJson<CreateUser>,
) -> Result<(StatusCode, Json<User>)> {
    let hashed_password = password_hasher
        .spawn_hash_password(request.password)
        .await?;

    let mut conn = pg_client.get_connection().await?;
    let user = conn
        .create_user(NewUser {
            email: request.email,
            hashed_password,
        })
        .await?;

    tracing::info!(target: TRACING_TARGET, user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(User::from_model(user))))
}

fn create_user_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Register a user")
        .description("Creates an account. Emails are trimmed and lowercased before storage.")
        .tag("users")
        .response::<201, Json<User>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Replaces the caller's email and password and signs out their other
/// sessions by revoking every refresh token they hold.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn update_user(
    State(pg_client): State<PgClient>,
    State(authenticator): State<Authenticator>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<UpdateUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user_id = auth_state.user_id();
    let hashed_password = authenticator.hash_password(&request.password).await?;

    let changes = UserChanges {
        email: Some(request.email),
        hashed_password: Some(hashed_password),
        ..UserChanges::default()
    };

    let mut conn = pg_client.get_connection().await?;
    let Some((user, revoked)) = conn
        .update_user_credentials(user_id, changes, authenticator.now())
        .await?
    else {
        return Err(ErrorKind::NotFound
            .with_message("User no longer exists")
            .with_resource("user"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        revoked_refresh_tokens = revoked,
        "user credentials updated"
    );

    Ok((StatusCode::OK, Json(User::from_model(user))))
}

fn update_user_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update credentials")
        .description(
            "Replaces the email and password of the authenticated user and revokes all of \
             their refresh tokens.",
        )
        .tag("users")
        .response::<200, Json<User>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns an [`ApiRouter`] with the user routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new().api_route(
        "/api/users",
        post_with(create_user, create_user_docs).put_with(update_user, update_user_docs),
    )
}
