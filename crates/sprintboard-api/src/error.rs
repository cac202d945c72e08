use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sprintboard_core::{BoardError, PageError};
use sprintboard_domain::ValidationError;
use thiserror::Error;

pub const NOT_FOUND: &str = "Not found.";
pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const AUTH_REALM: &str = "Basic realm=\"api\"";

/// Field name to the messages reported against it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Everything a handler can answer with instead of a resource.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-correctable input, reported per field.
    #[error("invalid input on {} field(s)", .0.len())]
    Invalid(FieldErrors),

    /// Request rejected before any field was looked at.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Invalid(errors)
    }

    pub fn not_found() -> Self {
        Self::NotFound(NOT_FOUND.to_string())
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Rejected { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Invalid(errors) => (status, Json(errors)).into_response(),
            Self::Rejected { detail, .. } | Self::NotFound(detail) => {
                (status, Json(json!({ "detail": detail }))).into_response()
            }
            Self::Unauthorized(detail) => {
                let mut response = (status, Json(json!({ "detail": detail }))).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(AUTH_REALM),
                );
                response
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (
                    status,
                    Json(json!({ "detail": "A server error occurred." })),
                )
                    .into_response()
            }
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotFound(_) => Self::not_found(),
            BoardError::UniqueViolation { field, message }
            | BoardError::InvalidReference { field, message } => Self::invalid(field, message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::invalid(err.field(), err.to_string())
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = match &rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                format!("JSON parse error - {}", rejection.body_text())
            }
            _ => rejection.body_text(),
        };
        Self::Rejected {
            status: rejection.status(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lands_on_its_field() {
        let err = ApiError::from(ValidationError::BacklogMustBeNotStarted);
        let ApiError::Invalid(errors) = err else {
            panic!("expected field errors");
        };
        assert_eq!(
            errors.get("non_field_errors"),
            Some(&vec!["Backlog tasks must have 'Not Started' status.".to_string()])
        );
    }

    #[test]
    fn test_store_errors() {
        let unique = ApiError::from(BoardError::UniqueViolation {
            field: "end".into(),
            message: "sprint with this end already exists.".into(),
        });
        assert_eq!(unique.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from(BoardError::not_found("Task", 3));
        assert!(matches!(missing, ApiError::NotFound(ref d) if d == NOT_FOUND));

        let io = ApiError::from(BoardError::Database("locked".into()));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::unauthorized(NOT_AUTHENTICATED).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            AUTH_REALM
        );
    }

    #[test]
    fn test_invalid_page_is_not_found() {
        let err = ApiError::from(PageError::InvalidPage);
        assert!(matches!(err, ApiError::NotFound(ref d) if d == "Invalid page."));
    }
}
