use crate::services::{EntryServiceError, UserServiceError};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

pub const USER_NOT_FOUND: &str = "no user found for the given id";
pub const ENTRY_NOT_FOUND: &str = "entry not found";
pub const INVALID_STATUS: &str = "could not update entry status, send a valid status";

/// Errors surfaced by the HTTP handlers.
///
/// Client-side failures become `400 {"message": ...}`; everything else is
/// logged and reported as a generic `500`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Authentication(msg) => AppError::Authentication(msg.to_string()),
            UserServiceError::EmailTaken => AppError::BadRequest(err.to_string()),
            UserServiceError::HashingError(_) | UserServiceError::RepositoryError(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<EntryServiceError> for AppError {
    fn from(err: EntryServiceError) -> Self {
        match err {
            EntryServiceError::Validation(e) => AppError::BadRequest(e.to_string()),
            EntryServiceError::NotFound => AppError::BadRequest(ENTRY_NOT_FOUND.to_string()),
            EntryServiceError::BalanceOverflow => AppError::BadRequest(err.to_string()),
            EntryServiceError::NotPersisted | EntryServiceError::RepositoryError(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Authentication(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RepositoryError;
    use crate::services::EntryValidationError;

    #[test]
    fn test_validation_error_keeps_literal_message() {
        let err = AppError::from(EntryServiceError::Validation(EntryValidationError::Year));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "provide a valid year"));
    }

    #[test]
    fn test_status_codes() {
        let auth = AppError::from(UserServiceError::Authentication("invalid password"));
        assert_eq!(auth.into_response().status(), StatusCode::BAD_REQUEST);

        let taken = AppError::from(UserServiceError::EmailTaken);
        assert_eq!(taken.into_response().status(), StatusCode::BAD_REQUEST);

        let overflow = AppError::from(EntryServiceError::BalanceOverflow);
        assert_eq!(overflow.into_response().status(), StatusCode::BAD_REQUEST);

        let misuse = AppError::from(EntryServiceError::NotPersisted);
        assert_eq!(
            misuse.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let store = AppError::from(UserServiceError::RepositoryError(
            RepositoryError::MalformedRow("bad".to_string()),
        ));
        assert_eq!(
            store.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
