use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::dto::{FieldErrors, MessageResponse};
use crate::error::ServiceError;

/// Everything a handler can fail with, mapped to a status code + JSON body
#[derive(Debug)]
pub enum ApiError {
    /// NotFound / Conflict / storage failure from the service
    Service(ServiceError),
    /// Request body failed validation; one entry per field
    Validation(FieldErrors),
    /// Anything else
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

fn unexpected(cause: &dyn std::fmt::Display) -> Response {
    error!(%cause, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new(format!(
            "An unexpected error occurred: {cause}"
        ))),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err @ ServiceError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                Json(MessageResponse::new(err.to_string())),
            )
                .into_response(),
            ApiError::Service(err @ ServiceError::Conflict { .. }) => (
                StatusCode::CONFLICT,
                Json(MessageResponse::new(err.to_string())),
            )
                .into_response(),
            ApiError::Service(err) => unexpected(&err),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::Internal(message) => unexpected(&message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Service(err) => write!(f, "{err}"),
            ApiError::Validation(errors) => write!(f, "validation failed: {errors:?}"),
            ApiError::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// `CatchPanicLayer` hook: a panicking handler becomes a 500
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn into_parts(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_panic_payloads_become_500() {
        let (status, body) = into_parts(panic_response(Box::new("boom"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred: boom");

        let (status, body) = into_parts(panic_response(Box::new(format!("index {}", 3)))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred: index 3");

        let (status, body) = into_parts(panic_response(Box::new(7_u32))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred: handler panicked");
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let err = ApiError::from(ServiceError::from(StorageError::LockPoisoned));

        let (status, body) = into_parts(err.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["message"],
            "An unexpected error occurred: storage lock poisoned"
        );
    }

    #[tokio::test]
    async fn test_duplicate_storage_error_is_409() {
        let err = ApiError::from(ServiceError::from(StorageError::Duplicate {
            swift_code: "BPKOPLPWXXX".to_string(),
        }));

        let (status, body) = into_parts(err.into_response()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["message"],
            "SwiftCode already exists with swiftCode: 'BPKOPLPWXXX'"
        );
    }
}
