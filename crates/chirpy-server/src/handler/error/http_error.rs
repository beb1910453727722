//! Handler error with a builder for per-request detail.
//!
//! Every [`ErrorKind`] maps to a fixed [`ErrorResponse`]; handlers refine it
//! with a message, the affected resource, a suggestion for the client, and
//! internal context that is logged but never serialized.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// The error type returned by handlers and extractors.
#[derive(Clone)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
    suggestion: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] of the given kind with no detail attached.
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            suggestion: None,
            context: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Replaces the default client-facing message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the resource the error relates to.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Adds a hint telling the client how to recover.
    #[inline]
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches internal context. It is logged but not sent to the client.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[inline]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Detaches the error from any borrowed data.
    pub fn into_static(self) -> Error<'static> {
        fn own(value: Option<Cow<'_, str>>) -> Option<Cow<'static, str>> {
            value.map(|value| Cow::Owned(value.into_owned()))
        }

        Error {
            kind: self.kind,
            message: own(self.message),
            resource: own(self.resource),
            suggestion: own(self.suggestion),
            context: own(self.context),
        }
    }

    /// Builds the serializable response body.
    pub fn to_response(&self) -> ErrorResponse<'_> {
        let mut response = self.kind.response();

        if let Some(message) = self.message.as_deref() {
            response = response.with_message(message);
        }

        if let Some(resource) = self.resource.as_deref() {
            response = response.with_resource(resource);
        }

        if let Some(suggestion) = self.suggestion.as_deref() {
            response = response.with_suggestion(suggestion);
        }

        if let Some(context) = self.context.as_deref() {
            response = response.with_context(context);
        }

        response
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("status", &self.kind.status_code())
            .field("message", &self.message)
            .field("resource", &self.resource)
            .field("suggestion", &self.suggestion)
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&response.message);
        write!(f, "{} ({}): {message}", response.name, response.status.as_u16())?;

        if let Some(resource) = &self.resource {
            write!(f, " [resource: {resource}]")?;
        }

        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl aide::OperationOutput for Error<'_> {
    type Inner = ();
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type of handlers and extractors.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Kinds of errors a handler can respond with.
#[must_use = "error kinds do nothing unless turned into an error"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400: a required path parameter is missing or unparsable.
    MissingPathParam,
    /// 400: the request body or query is invalid.
    BadRequest,
    /// 401: no `Authorization` header was sent.
    MissingAuthToken,
    /// 401: the `Authorization` header could not be parsed.
    MalformedAuthToken,
    /// 401: the credentials or token were rejected.
    Unauthorized,
    /// 403: the caller may not act on the resource.
    Forbidden,
    /// 404: the resource does not exist.
    NotFound,
    /// 409: the request conflicts with existing state.
    Conflict,
    /// 500: an unexpected server-side failure.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn with_suggestion<'a>(self, suggestion: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_suggestion(suggestion)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Returns the HTTP status code of this kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default response body of this kind.
    pub const fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::MissingPathParam => ErrorResponse::MISSING_PATH_PARAM,
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_internal_server_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.kind().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_kinds_are_unauthorized() {
        for kind in [
            ErrorKind::MissingAuthToken,
            ErrorKind::MalformedAuthToken,
            ErrorKind::Unauthorized,
        ] {
            assert_eq!(kind.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn builder_sets_every_field() {
        let error = ErrorKind::NotFound
            .with_message("Chirp not found")
            .with_resource("chirp")
            .with_suggestion("Check the chirp id")
            .with_context("id=42");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), Some("Chirp not found"));
        assert_eq!(error.resource(), Some("chirp"));
        assert_eq!(error.suggestion(), Some("Check the chirp id"));
        assert_eq!(error.context(), Some("id=42"));
    }

    #[test]
    fn custom_message_replaces_default() {
        let error = ErrorKind::Conflict.with_message("Email is already registered");
        let response = error.to_response();
        assert_eq!(response.message, "Email is already registered");
        assert_eq!(response.name, "conflict");
    }

    #[test]
    fn display_omits_suggestion() {
        let error = ErrorKind::Forbidden
            .with_message("Not your chirp")
            .with_resource("chirp")
            .with_suggestion("Delete your own chirps only");

        let display = error.to_string();
        assert!(display.contains("forbidden"));
        assert!(display.contains("403"));
        assert!(display.contains("Not your chirp"));
        assert!(display.contains("chirp"));
        assert!(!display.contains("Delete your own"));
    }

    #[test]
    fn into_static_keeps_detail() {
        let message = String::from("borrowed");
        let error = ErrorKind::BadRequest.with_message(message.as_str()).into_static();
        drop(message);
        assert_eq!(error.message(), Some("borrowed"));
    }

    #[test]
    fn status_matches_response() {
        let response = ErrorKind::Conflict.into_error().into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
