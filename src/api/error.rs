use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::SqlErr;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Unauthorized: {1}")]
    Unauthorized(&'static str, String),

    #[error("Forbidden: {1}")]
    Forbidden(&'static str, String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {1}")]
    Conflict(&'static str, String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden("INSUFFICIENT_PERMISSIONS", message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized("UNAUTHORIZED", message.into())
    }

    /// Status and machine readable code of this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => (StatusCode::CONFLICT, "CONFLICT"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            AppError::Unauthorized(code, _) => (StatusCode::UNAUTHORIZED, *code),
            AppError::Forbidden(code, _) => (StatusCode::FORBIDDEN, *code),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(code, _) => (StatusCode::CONFLICT, *code),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            AppError::Internal(_) | AppError::Anyhow(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            AppError::Database(e) => {
                if status == StatusCode::CONFLICT {
                    tracing::warn!("Unique constraint violation: {:?}", e);
                    "Resource already exists".to_string()
                } else {
                    tracing::error!("Database error: {:?}", e);
                    "Internal Server Error".to_string()
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Anyhow(e) => {
                tracing::error!("Anyhow error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Unauthorized(_, msg)
            | AppError::Forbidden(_, msg)
            | AppError::Conflict(_, msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::UnsupportedMediaType(msg) => msg,
        };

        let body = Json(json!({
            "success": false,
            "code": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_forbidden_body() {
        let (status, json) = body_json(AppError::forbidden("nope")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INSUFFICIENT_PERMISSIONS");
        assert_eq!(json["message"], "nope");
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, json) = body_json(AppError::Internal("db password leaked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_conflict_code() {
        let (status, json) =
            body_json(AppError::Conflict("DUPLICATE_SUBMISSION", "already".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "DUPLICATE_SUBMISSION");
    }
}
