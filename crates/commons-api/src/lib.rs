//! # commons-api
//!
//! Builds the `{result, data, error_message, error_code}` envelope and
//! turns it into an axum response.

pub mod error;
pub mod response;

pub use error::{ApiError, ErrorResponse, ResponseError};
pub use response::{build_envelope, send_response};
