//! Token and random byte generation.

use rand::RngCore;
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use uuid::Uuid;

use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

/// SHA-1 hex digest of `seed`, or of a random UUID v4 when no seed is given.
pub fn generate_unique_token(seed: Option<&str>) -> String {
    let seed = match seed {
        Some(seed) => seed.to_string(),
        None => Uuid::new_v4().to_string(),
    };
    hex::encode(Sha1::digest(seed.as_bytes()))
}

/// `count` cryptographically strong random bytes, hex encoded.
pub fn generate_random_bytes(count: usize) -> AppResult<String> {
    let mut buf = vec![0u8; count];
    OsRng.try_fill_bytes(&mut buf).map_err(|e| {
        AppError::with_source(ErrorKind::Internal, "Failed to generate random bytes", e)
    })?;
    Ok(hex::encode(buf))
}
