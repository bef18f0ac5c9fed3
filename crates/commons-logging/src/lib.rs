//! # commons-logging
//!
//! Installs the process-wide `tracing` subscriber: a console sink plus an
//! optional `application.log` file sink. Initialization is idempotent so
//! every consumer can call [`initialize`] without coordinating.
//!
//! Example plain output:
//!
//! ```text
//! 2018-06-19T09:20:30.742Z  - INFO - Starting Application
//! ```

pub mod format;
pub mod logger;

pub use format::{LogFormat, PlainFormat};
pub use logger::{Logger, initialize};
