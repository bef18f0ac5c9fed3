//! # commons-core
//!
//! Core crate for the commons workspace. Contains the unified error
//! system, configuration schemas (including the storage credential
//! holder), the traits the service wrappers are built on, and the
//! response envelope type.
//!
//! This crate has **no** internal dependencies on other commons crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
