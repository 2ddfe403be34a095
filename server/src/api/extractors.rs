//! Validating extractors for API routes

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

/// Maximum length of a user or group id
pub const MAX_ID_LENGTH: usize = 256;
/// Maximum ids accepted in one batch request
pub const MAX_ID_BATCH: usize = 500;

/// Validator for id lists: bounded batch, bounded id length.
///
/// Emptiness is left to the service, which owns that error message.
pub fn validate_id_list<T: AsRef<[String]>>(ids: T) -> Result<(), ValidationError> {
    let ids = ids.as_ref();
    if ids.len() > MAX_ID_BATCH {
        return Err(ValidationError::new("ids_too_many").with_message(
            format!("Cannot process more than {} ids at once", MAX_ID_BATCH).into(),
        ));
    }
    if ids.iter().any(|id| id.len() > MAX_ID_LENGTH) {
        return Err(ValidationError::new("id_too_long")
            .with_message(format!("ID too long (max {} chars)", MAX_ID_LENGTH).into()));
    }
    Ok(())
}

/// Rejection with the same `{error, code, message}` body as `ApiError`
pub enum ValidationRejection {
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::Json(rejection) => ("JSON_PARSE_ERROR", rejection.body_text()),
            Self::Validation(errors) => ("INVALID_ARGUMENT", format_validation_errors(&errors)),
        };
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// JSON body extractor with automatic validation.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_list() {
        assert!(validate_id_list(Vec::<String>::new()).is_ok());
        assert!(validate_id_list(vec!["usr-1".to_string()]).is_ok());

        let long = vec!["x".repeat(MAX_ID_LENGTH + 1)];
        assert_eq!(validate_id_list(long).unwrap_err().code, "id_too_long");

        let many = vec!["id".to_string(); MAX_ID_BATCH + 1];
        assert_eq!(validate_id_list(many).unwrap_err().code, "ids_too_many");
    }
}
