//! Errors that can be rendered into the response envelope.

use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use commons_core::error::{AppError, ErrorKind};

/// An error that knows how it is reported to clients.
pub trait ResponseError {
    /// Message placed in `error_message`.
    fn message(&self) -> String;

    /// Value placed in `error_code`.
    fn code(&self) -> Option<Value> {
        None
    }

    /// HTTP status. Only values greater than zero are applied.
    fn status(&self) -> Option<u16> {
        None
    }
}

impl ResponseError for AppError {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn code(&self) -> Option<Value> {
        Some(Value::String(self.kind.to_string()))
    }

    fn status(&self) -> Option<u16> {
        Some(self.kind.status_code())
    }
}

/// A plain error with caller-chosen code and status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code of any JSON type.
    #[serde(default)]
    pub code: Option<Value>,
    /// HTTP status.
    #[serde(default)]
    pub status: Option<u16>,
}

impl ApiError {
    /// Error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the code.
    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl ResponseError for ApiError {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn code(&self) -> Option<Value> {
        self.code.clone()
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        crate::response::send_response(Some(&self), None)
    }
}

/// Handler error type rendering an [`AppError`] as an envelope.
///
/// `?` converts any `AppError` into it.
#[derive(Debug)]
pub struct ErrorResponse(pub AppError);

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        if matches!(self.0.kind, ErrorKind::Internal) {
            tracing::error!(error = %self.0.message, "Internal server error");
        }
        crate::response::send_response(Some(&self.0), None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_app_error_fields() {
        let err = AppError::not_found("missing");
        assert_eq!(ResponseError::message(&err), "missing");
        assert_eq!(err.code(), Some(json!("NOT_FOUND")));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_api_error_builder() {
        let err = ApiError::new("teapot").with_code(418).with_status(418);
        assert_eq!(err.code(), Some(json!(418)));
        assert_eq!(err.status(), Some(418));
        assert_eq!(ApiError::new("x").status(), None);
    }
}
