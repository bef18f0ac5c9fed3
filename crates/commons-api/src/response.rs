//! Envelope construction and HTTP rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use commons_core::types::ResponseEnvelope;

use crate::error::ResponseError;

/// Build the envelope for an optional error and optional data.
pub fn build_envelope<E>(error: Option<&E>, data: Option<Value>) -> ResponseEnvelope
where
    E: ResponseError + ?Sized,
{
    match error {
        None => ResponseEnvelope::success(data),
        Some(err) => ResponseEnvelope::failure(err.message(), err.code(), data),
    }
}

/// Build the envelope and render it as a JSON response.
///
/// The status is the error's status when it is a valid code greater than
/// zero, otherwise `200 OK`.
pub fn send_response<E>(error: Option<&E>, data: Option<Value>) -> Response
where
    E: ResponseError + ?Sized,
{
    let status = error
        .and_then(|err| err.status())
        .filter(|s| *s > 0)
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::OK);

    (status, Json(build_envelope(error, data))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use commons_core::error::AppError;
    use serde_json::json;

    use super::*;
    use crate::error::{ApiError, ErrorResponse};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_without_data() {
        let response = send_response::<ApiError>(None, None);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"result": true, "data": null, "error_message": "", "error_code": null})
        );
    }

    #[tokio::test]
    async fn test_success_with_data() {
        let response = send_response::<ApiError>(None, Some(json!([1, 2])));
        assert_eq!(body_json(response).await["data"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_error_with_status() {
        let err = ApiError::new("Not found").with_code("E404").with_status(404);
        let response = send_response(Some(&err), None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"result": false, "data": null, "error_message": "Not found", "error_code": "E404"})
        );
    }

    #[tokio::test]
    async fn test_error_without_status_keeps_200() {
        for err in [ApiError::new("soft"), ApiError::new("zero").with_status(0)] {
            let response = send_response(Some(&err), Some(json!({"partial": true})));
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["result"], false);
            assert_eq!(body["data"], json!({"partial": true}));
        }
    }

    #[tokio::test]
    async fn test_app_error_into_response() {
        let response = ErrorResponse::from(AppError::validation("bad input")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error_message"], "bad input");
        assert_eq!(body["error_code"], "VALIDATION");
    }
}
