//! Trait definitions for the pluggable seams of the service wrappers.
//!
//! Implementations live in the crates that own the third-party client.

pub mod broker;
pub mod storage;

pub use broker::{JobBroker, in_flight_key};
pub use storage::{ObjectAcl, ObjectBackend, PutObject};
