//! # commons-database
//!
//! Opens and supervises a single long-lived PostgreSQL connection pool
//! and publishes its lifecycle state.

pub mod connection;
pub mod state;

pub use connection::{ConnectOptions, ConnectionManager};
pub use state::ConnectionState;
