//! Core type definitions shared across the workspace.

pub mod response;

pub use response::ResponseEnvelope;
