//! JSON body extractor with `validator` checks.

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Deserializes a JSON body and runs [`Validate::validate`] on it.
///
/// Validation failures become a `bad_request` response whose message lists
/// every failed field.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        <Json<T> as aide::OperationInput>::operation_input(ctx, operation);
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| describe_validation_error(field, error))
            })
            .collect::<Vec<_>>();
        messages.sort();

        tracing::debug!(errors = ?messages, "request validation failed");

        ErrorKind::BadRequest
            .with_message(messages.join(". "))
            .with_resource("request")
    }
}

fn describe_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    match error.code.as_ref() {
        "email" => format!("Field '{field}' must be a valid email address"),
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => {
                format!("Field '{field}' must be between {min} and {max} characters long")
            }
            (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
            (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
            (None, None) => format!("Field '{field}' has an invalid length"),
        },
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Credentials {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1))]
        password: String,
    }

    #[test]
    fn validation_errors_become_bad_request() {
        let credentials = Credentials {
            email: "not-an-email".to_owned(),
            password: String::new(),
        };

        let error = Error::from(credentials.validate().expect_err("invalid input"));
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let message = error.message().unwrap_or_default();
        assert!(message.contains("Field 'email' must be a valid email address"));
        assert!(message.contains("Field 'password' must be at least 1 characters long"));
    }
}
