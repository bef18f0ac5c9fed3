//! Parsing of `data:<type>;base64,<payload>` strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

/// Declared MIME subtype: the text after the first `/` of the part before
/// the first `;`. `data:image/png;base64,...` yields `png`.
pub fn declared_subtype(data: &str) -> Option<&str> {
    let head = data.split(';').next().unwrap_or(data);
    head.split('/').nth(1)
}

/// Approximate decoded size of a base64 string: `ceil(len * 3 / 4)`.
///
/// Computed over the whole string, prefix included, so it slightly
/// overestimates.
pub fn estimated_size(data: &str) -> u64 {
    (data.len() as u64 * 3).div_ceil(4)
}

/// Split a data URI into its content type and base64 payload.
///
/// The content type is the prefix text between the last `:` and the last
/// `;`, e.g. `image/png`.
pub fn split(data: &str) -> AppResult<(&str, &str)> {
    let (prefix, payload) = data
        .split_once(',')
        .ok_or_else(|| AppError::validation("File data is not a data URI"))?;

    let start = prefix.rfind(':').map_or(0, |i| i + 1);
    let end = prefix.rfind(';').filter(|&i| i >= start).unwrap_or(prefix.len());

    Ok((&prefix[start..end], payload))
}

/// Decode a standard base64 payload.
pub fn decode(payload: &str) -> AppResult<Bytes> {
    STANDARD
        .decode(payload.trim())
        .map(Bytes::from)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("File data is not valid base64: {e}"),
                e,
            )
        })
}
