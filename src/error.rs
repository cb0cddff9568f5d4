use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Terminal failure of a single request. Nothing here is retried; every
/// variant maps to exactly one HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,

    #[error("Invalid ID syntax. Should be UUID")]
    InvalidIdentifier,

    #[error("Incorrect user")]
    Unauthorized,

    #[error("Unable to cast vote")]
    InvalidVote,

    #[error("Idea already bookmarked")]
    AlreadyBookmarked,

    #[error("Idea is not bookmarked")]
    NotBookmarked,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid Username/Password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidIdentifier
            | ApiError::InvalidVote
            | ApiError::AlreadyBookmarked
            | ApiError::NotBookmarked
            | ApiError::UserExists
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(status_of(ApiError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ApiError::InvalidIdentifier), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::InvalidVote), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::AlreadyBookmarked), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::NotBookmarked), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::UserExists), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ApiError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn passthrough_errors_are_internal() {
        assert_eq!(
            status_of(ApiError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
