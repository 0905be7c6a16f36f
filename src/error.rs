use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error taxonomy shared by the REST and GraphQL surfaces.
///
/// Every service error is translated to one of these at the handler
/// boundary; the REST layer maps them to status codes and the GraphQL
/// layer attaches the matching `code` extension.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// GraphQL error code extension for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "BAD_USER_INPUT",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Never leak database or internal details to clients
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
            tracing::error!("request failed: {}", self);
        }

        let body = json!({
            "success": false,
            "error": self.public_message(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}

impl async_graphql::ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
            tracing::error!("graphql request failed: {}", self);
        }

        let code = self.code();
        async_graphql::Error::new(self.public_message()).extend_with(|_, e| e.set("code", code))
    }
}

impl From<crate::repositories::RepositoryError> for AppError {
    fn from(err: crate::repositories::RepositoryError) -> Self {
        use crate::repositories::RepositoryError;
        match err {
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepositoryError::AlreadyExists => {
                AppError::Conflict("Resource already exists".to_string())
            }
        }
    }
}

impl From<crate::services::user_service::UserServiceError> for AppError {
    fn from(err: crate::services::user_service::UserServiceError) -> Self {
        use crate::services::user_service::UserServiceError;
        match err {
            UserServiceError::InvalidName
            | UserServiceError::InvalidEmail
            | UserServiceError::WeakPassword
            | UserServiceError::AlreadyVerified
            | UserServiceError::InvalidCode => AppError::Validation(err.to_string()),
            UserServiceError::EmailTaken => AppError::Conflict(err.to_string()),
            UserServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            UserServiceError::HashingError(msg) => AppError::Internal(msg),
            UserServiceError::Email(e) => AppError::Internal(e.to_string()),
            UserServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<crate::services::auth_service::AuthServiceError> for AppError {
    fn from(err: crate::services::auth_service::AuthServiceError) -> Self {
        use crate::services::auth_service::AuthServiceError;
        match err {
            AuthServiceError::InvalidCredentials => {
                AppError::Unauthenticated(err.to_string())
            }
            AuthServiceError::EmailNotVerified => AppError::Forbidden(err.to_string()),
            AuthServiceError::Token(e) => AppError::Internal(e.to_string()),
            AuthServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<crate::services::poll_service::PollServiceError> for AppError {
    fn from(err: crate::services::poll_service::PollServiceError) -> Self {
        use crate::services::poll_service::PollServiceError;
        match err {
            PollServiceError::Validation(msg) => AppError::Validation(msg),
            PollServiceError::PollNotFound | PollServiceError::OptionNotFound => {
                AppError::NotFound(err.to_string())
            }
            PollServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            PollServiceError::DuplicateVote => AppError::Conflict(err.to_string()),
            PollServiceError::NotOwner => AppError::Forbidden(err.to_string()),
            PollServiceError::Repository(e) => e.into(),
        }
    }
}
