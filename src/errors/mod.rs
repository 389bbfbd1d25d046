use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::utils::jwt::RejectionReason;

/// Discriminant of [`AppError`], useful where callers only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    InternalFailure,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InternalFailure(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error_message: String,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::InternalFailure(_) => ErrorKind::InternalFailure,
        }
    }

    /// Logs `context` and returns the opaque failure shown to clients.
    pub fn internal(context: impl std::fmt::Display) -> Self {
        log::error!("{}", context);
        AppError::InternalFailure("Internal server error".to_string())
    }
}

impl From<RejectionReason> for AppError {
    fn from(reason: RejectionReason) -> Self {
        AppError::Unauthenticated(reason.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error_message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_kind() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::InternalFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{:?}", err.kind());
        }
    }

    #[test]
    fn rejection_reason_maps_to_unauthenticated() {
        let err = AppError::from(RejectionReason::TokenExpired);
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.to_string(), RejectionReason::TokenExpired.to_string());
    }

    #[test]
    fn internal_hides_context() {
        let err = AppError::internal("connection refused to db at 10.0.0.3");
        assert_eq!(err.kind(), ErrorKind::InternalFailure);
        assert!(!err.to_string().contains("10.0.0.3"));
    }

    #[actix_web::test]
    async fn body_carries_error_message() {
        let resp = AppError::Conflict("Email already registered".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error_message"], "Email already registered");
    }
}
