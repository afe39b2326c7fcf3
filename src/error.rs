use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routes::tasks::repository::RepositoryError;
use crate::routes::tasks::service::TaskServiceError;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    MalformedBody(String),
    /// Unparseable path segment or query string.
    InvalidParameter(String),
    NotFound,
    Internal(RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(error) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: "Validation failed".to_string(),
                    details: Some(error.errors),
                }),
            )
                .into_response(),
            ApiError::MalformedBody(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    code: "MALFORMED_BODY",
                    message,
                    details: None,
                }),
            )
                .into_response(),
            ApiError::InvalidParameter(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    code: "INVALID_PARAMETER",
                    message,
                    details: None,
                }),
            )
                .into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(error) => {
                // storage details stay in the log
                tracing::error!(%error, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An internal error occurred".to_string(),
                        details: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidParameter(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidParameter(rejection.body_text())
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(error: TaskServiceError) -> Self {
        match error {
            TaskServiceError::InvalidArgument { field, message } => {
                ApiError::Validation(ValidationError::single(field, message))
            }
            TaskServiceError::NotFound(_) => ApiError::NotFound,
            TaskServiceError::Repository(error) => ApiError::Internal(error),
        }
    }
}
