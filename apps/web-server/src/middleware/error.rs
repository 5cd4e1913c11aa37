//! Error handling - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::DomainError;
use quill_core::error::RepoError;
use quill_core::validation::ValidationError;
use quill_shared::{ErrorResponse, FieldError};
use std::fmt;

use crate::observability::current_request_id;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    /// No live session, or a failed login.
    Unauthorized(String),
    /// Signed in, but not the owner.
    Forbidden,
    Conflict(String),
    Validation(ValidationError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Validation(errors) => write!(f, "Validation failed: {errors}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized(detail),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Validation(errors) => ErrorResponse::validation(
                errors
                    .violations
                    .iter()
                    .map(|v| FieldError {
                        field: v.field.clone(),
                        message: v.message.clone(),
                    })
                    .collect(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(with_request_id(error))
    }
}

/// Stamp the current request's correlation ID on an error body.
pub fn with_request_id(error: ErrorResponse) -> ErrorResponse {
    match current_request_id() {
        Some(id) => error.with_request_id(id),
        None => error,
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{entity_type} with id {id} not found"))
            }
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Unauthorized => AppError::Forbidden,
            DomainError::Storage(repo) => AppError::from(repo),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Duplicate(msg) | RepoError::ForeignKey(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::user_not_found(1), StatusCode::NOT_FOUND),
            (DomainError::Unauthorized, StatusCode::FORBIDDEN),
            (
                DomainError::Validation(ValidationError::duplicate_email()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::Storage(RepoError::Duplicate("users.email".into())),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Storage(RepoError::Connection("refused".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Internal("join error".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (domain, status) in cases {
            assert_eq!(AppError::from(domain).status_code(), status);
        }
    }

    #[actix_web::test]
    async fn internal_details_stay_out_of_the_body() {
        let err = AppError::from(DomainError::Storage(RepoError::Query(
            "relation \"users\" does not exist".into(),
        )));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Internal Server Error"));
        assert!(!text.contains("relation"));
    }
}
