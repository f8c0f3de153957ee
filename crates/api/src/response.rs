//! The `{status, message, data}` response envelope and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pactfile_shared::AppError;
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Handler result type; errors render through the envelope.
pub type ApiResult<T> = Result<T, ApiError>;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `"success"`.
    pub status: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// Payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps data with the default success message.
    pub fn ok(data: T) -> Json<Self> {
        Self::with_message("success", data)
    }

    /// Wraps data with a custom message.
    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data,
        })
    }
}

/// Application error rendered through the envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %err, "request failed");
        }

        let body = json!({
            "status": "error",
            "message": err.to_string(),
            "code": err.error_code(),
            "details": err.messages(),
            "data": null,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_400_with_details() {
        let err = ApiError(AppError::Validation(vec![
            "first".to_string(),
            "second".to_string(),
        ]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_is_404() {
        let response = ApiError(AppError::NotFound("file file_001".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_forbidden_is_403() {
        let response = ApiError(AppError::Forbidden("wrong company".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
