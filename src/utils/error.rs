use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

use crate::utils::response::ApiResponse;

const DUPLICATE_KEY: i32 = 11000;

/// Every failure a handler can surface. Each variant maps to exactly one HTTP status.
#[derive(Debug, Error)]
pub enum CampusError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("User already voted")]
    AlreadyVoted,
    #[error("Invalid option")]
    InvalidOption,

    #[error("database error: {0}")]
    Database(mongodb::error::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl CampusError {
    pub fn validation(message: impl Into<String>) -> Self {
        CampusError::Validation(message.into())
    }

    pub fn not_found(what: &str) -> Self {
        CampusError::NotFound(format!("{} not found", what))
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self {
            CampusError::Database(_)
            | CampusError::Token(_)
            | CampusError::Io(_)
            | CampusError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for CampusError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return CampusError::Conflict("A record with the same unique value already exists".to_string());
        }
        CampusError::Database(err)
    }
}

/// Detects a unique index violation reported by the server.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl ResponseError for CampusError {
    fn status_code(&self) -> StatusCode {
        match self {
            CampusError::Validation(_) | CampusError::AlreadyVoted | CampusError::InvalidOption => {
                StatusCode::BAD_REQUEST
            }
            CampusError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CampusError::Forbidden(_) => StatusCode::FORBIDDEN,
            CampusError::NotFound(_) => StatusCode::NOT_FOUND,
            CampusError::Conflict(_) => StatusCode::CONFLICT,
            CampusError::Database(_)
            | CampusError::Token(_)
            | CampusError::Io(_)
            | CampusError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ Unexpected error: {}", self);
        }

        HttpResponse::build(status).json(ApiResponse::<()>::failure(self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(CampusError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CampusError::AlreadyVoted.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CampusError::InvalidOption.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CampusError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(CampusError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(CampusError::not_found("Club").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(CampusError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            CampusError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(CampusError::not_found("Poll").to_string(), "Poll not found");
    }

    #[actix_web::test]
    async fn test_internal_error_hides_details() {
        let response = CampusError::Internal("secret connection string".into()).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Internal server error");
        assert!(json["data"].is_null());
    }

    #[actix_web::test]
    async fn test_poll_rejection_envelope() {
        let response = CampusError::AlreadyVoted.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["message"], "User already voted");
    }
}
