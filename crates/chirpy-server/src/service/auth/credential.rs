//! Parsing of the `Authorization` header into a credential string.
//!
//! Two schemes are recognized: `Bearer <token>` for session and refresh
//! tokens, and `ApiKey <key>` for the payment provider webhook. The prefix
//! match is case-sensitive and requires exactly one separating space.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Prefix of the bearer scheme, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Prefix of the API key scheme, including the separating space.
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Reasons an `Authorization` header could not yield a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("authorization header does not use the expected scheme")]
    Malformed,
    #[error("authorization header carries an empty credential")]
    EmptyToken,
}

/// Extracts the token of an `Authorization: Bearer <token>` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, CredentialError> {
    extract_with_prefix(headers, BEARER_PREFIX)
}

/// Extracts the key of an `Authorization: ApiKey <key>` header.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, CredentialError> {
    extract_with_prefix(headers, API_KEY_PREFIX)
}

fn extract_with_prefix<'a>(headers: &'a HeaderMap, prefix: &str) -> Result<&'a str, CredentialError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::MissingHeader)?
        .to_str()
        .map_err(|_| CredentialError::Malformed)?;

    let credential = value
        .strip_prefix(prefix)
        .ok_or(CredentialError::Malformed)?
        .trim();

    if credential.is_empty() {
        return Err(CredentialError::EmptyToken);
    }

    Ok(credential)
}
