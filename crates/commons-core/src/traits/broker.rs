//! Job broker trait for list-style work queues.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Key of the list holding payloads reserved from `queue` but not yet acked.
pub fn in_flight_key(queue: &str) -> String {
    format!("{queue}:processing")
}

/// A durable FIFO of serialized jobs.
///
/// Consumers `reserve` a payload, which moves it to the in-flight list of
/// the queue, and `ack` it once handled. Payloads left in flight by a
/// consumer that died can be put back with `requeue_in_flight`.
#[async_trait]
pub trait JobBroker: Send + Sync + std::fmt::Debug + 'static {
    /// Append a payload to the tail of `queue`.
    async fn push(&self, queue: &str, payload: &str) -> AppResult<()>;

    /// Remove and return the head of `queue`, waiting up to `timeout`.
    /// `None` on timeout.
    async fn pop(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>>;

    /// Move the head of `queue` to its in-flight list and return it,
    /// waiting up to `timeout`. `None` on timeout.
    async fn reserve(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>>;

    /// Remove one reserved payload from the in-flight list of `queue`.
    async fn ack(&self, queue: &str, payload: &str) -> AppResult<()>;

    /// Move every in-flight payload of `queue` back to its head, oldest
    /// first. Returns how many were moved.
    async fn requeue_in_flight(&self, queue: &str) -> AppResult<u64>;

    /// Append a payload to `key` and let the key expire after `ttl`.
    async fn publish(&self, key: &str, payload: &str, ttl: Duration) -> AppResult<()>;

    /// Number of payloads waiting in `queue`.
    async fn len(&self, queue: &str) -> AppResult<u64>;

    /// Check whether the broker is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
