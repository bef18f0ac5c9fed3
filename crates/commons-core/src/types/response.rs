//! The response envelope returned at the request boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized success/error response body.
///
/// Field names are part of the wire contract and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// `true` when no error occurred.
    pub result: bool,
    /// Response payload, `null` when absent.
    pub data: Value,
    /// Human-readable error message, empty on success.
    pub error_message: String,
    /// Machine-readable error code, `null` on success.
    pub error_code: Value,
}

impl ResponseEnvelope {
    /// Envelope for a successful call.
    pub fn success(data: Option<Value>) -> Self {
        Self {
            result: true,
            data: data.unwrap_or(Value::Null),
            error_message: String::new(),
            error_code: Value::Null,
        }
    }

    /// Envelope for a failed call.
    pub fn failure(message: impl Into<String>, code: Option<Value>, data: Option<Value>) -> Self {
        Self {
            result: false,
            data: data.unwrap_or(Value::Null),
            error_message: message.into(),
            error_code: code.unwrap_or(Value::Null),
        }
    }
}
