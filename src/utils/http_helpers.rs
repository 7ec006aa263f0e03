use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::RecorderError;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }
}

impl From<RecorderError> for HTTPError {
    fn from(err: RecorderError) -> Self {
        HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Renders as `{"error": "<message>"}`.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_status_and_error_body() {
        let response = HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, "recorder busy").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"error": "recorder busy"}));
    }

    #[test]
    fn recorder_errors_map_to_internal_server_error() {
        let err = RecorderError::Logging("no subscriber".to_string());
        let response = HTTPError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
