//! Error types for uspshare-api
//!
//! Every error renders as `{"error": "<short text>"}` with a matching status.
//! Storage, timeout and other internal failures are logged here and reach
//! the client only as a generic message.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uspshare_common::Error as CommonError;
use uuid::Uuid;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error (500), message is shown to the client
    #[error("Internal server error: {0}")]
    Internal(String),

    /// uspshare-common error
    #[error("Common error: {0}")]
    Common(#[from] CommonError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Io(err) => {
                error!(error = %err, "I/O failure while handling request");
                internal()
            }
            ApiError::Common(err) => match err {
                CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                CommonError::Auth(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string()),
                CommonError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                // duplicate keys are reported as a failed write
                CommonError::Conflict(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
                other => {
                    error!(error = %other, "Request failed");
                    internal()
                }
            },
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Multipart processing error: {}", err.body_text()))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Parse a path identifier, naming the entity in the 400 message
pub fn parse_id(raw: &str, entity: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", entity)))
}

/// Map a common `NotFound` to a 404 carrying `message`; other errors pass through
pub fn not_found_as(message: &'static str) -> impl Fn(CommonError) -> ApiError {
    move |err| match err {
        CommonError::NotFound(_) => ApiError::NotFound(message.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_common_errors_map_to_status() {
        let (status, body) = render(CommonError::NotFound("Resource x".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource x");

        let (status, _) = render(CommonError::InvalidInput("bad".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = render(CommonError::Forbidden("no".into()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = render(CommonError::Auth("expired".into()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(CommonError::Timeout("list_resource_views".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = render(CommonError::Database(sqlx::Error::PoolClosed).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "resource").unwrap(), id);
        assert!(matches!(
            parse_id("abc", "resource"),
            Err(ApiError::BadRequest(msg)) if msg == "Invalid resource ID"
        ));
    }
}
