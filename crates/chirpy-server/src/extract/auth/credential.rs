//! Raw `Authorization` header credentials.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use derive_more::Deref;

use crate::handler::Error;
use crate::service::auth::{extract_api_key, extract_bearer};

/// The credential of an `Authorization: Bearer <token>` header.
///
/// Used where the bearer value is not a session token, such as the refresh
/// and revoke endpoints.
#[derive(Clone, Deref, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        Ok(Self(token.to_owned()))
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl aide::OperationInput for BearerToken {}

/// The credential of an `Authorization: ApiKey <key>` header.
#[derive(Clone, Deref, PartialEq, Eq)]
pub struct ApiKey(pub String);

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = extract_api_key(&parts.headers)?;
        Ok(Self(key.to_owned()))
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl aide::OperationInput for ApiKey {}
