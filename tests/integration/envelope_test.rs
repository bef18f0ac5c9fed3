//! Integration tests for response envelopes rendered by handlers.

use axum::Json;
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use commons::{AppError, AppResult};
use commons::api::{ApiError, ErrorResponse, send_response};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn lookup(id: u32) -> AppResult<u32> {
    if id == 0 {
        return Err(AppError::not_found("User not found"));
    }
    Ok(id)
}

async fn find_user(id: u32) -> Result<Json<Value>, ErrorResponse> {
    let id = lookup(id)?;
    Ok(Json(json!({"id": id})))
}

#[tokio::test]
async fn test_success_envelope() {
    let response = send_response::<ApiError>(None, Some(json!({"n": 1})));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"result": true, "data": {"n": 1}, "error_message": "", "error_code": null})
    );
}

#[tokio::test]
async fn test_failure_envelope_applies_status() {
    let err = ApiError::new("bad").with_code(400).with_status(400);
    let response = send_response(Some(&err), None);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"result": false, "data": null, "error_message": "bad", "error_code": 400})
    );
}

#[tokio::test]
async fn test_handler_error_propagates_with_question_mark() {
    let response = find_user(0).await.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["result"], false);
    assert_eq!(body["error_message"], "User not found");
    assert_eq!(body["error_code"], "NOT_FOUND");

    let response = find_user(7).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}
