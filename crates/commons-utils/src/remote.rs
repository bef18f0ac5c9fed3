//! Remote resource helpers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

/// Build `data:<content_type>;base64,<payload>`.
pub fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Download `image_url` and return it as a base64 data URI.
///
/// Only a `200 OK` response is accepted.
pub async fn convert_url_to_base64(client: &reqwest::Client, image_url: &str) -> AppResult<String> {
    let response = client.get(image_url).send().await.map_err(|e| {
        tracing::error!(url = image_url, error = %e, "Failed to download image");
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Failed to download {image_url}"),
            e,
        )
    })?;

    if response.status() != StatusCode::OK {
        tracing::error!(url = image_url, status = %response.status(), "Unexpected image response");
        return Err(AppError::external_service(format!(
            "Downloading {image_url} returned {}",
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let body = response.bytes().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Failed to read body of {image_url}"),
            e,
        )
    })?;

    Ok(to_data_uri(&content_type, &body))
}
