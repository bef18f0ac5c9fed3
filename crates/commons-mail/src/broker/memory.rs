//! In-process broker for tests and single-node development.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use commons_core::error::AppError;
use commons_core::result::AppResult;
use commons_core::traits::{JobBroker, in_flight_key};

/// Broker keeping every queue in memory.
///
/// Published keys never expire.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
    pushed: Notify,
}

impl MemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, HashMap<String, VecDeque<String>>>> {
        self.queues
            .lock()
            .map_err(|_| AppError::queue("Memory broker lock poisoned"))
    }

    fn try_pop(&self, queue: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get_mut(queue).and_then(VecDeque::pop_front))
    }

    fn try_reserve(&self, queue: &str) -> AppResult<Option<String>> {
        let mut queues = self.lock()?;
        let payload = queues.get_mut(queue).and_then(VecDeque::pop_front);
        if let Some(payload) = &payload {
            queues
                .entry(in_flight_key(queue))
                .or_default()
                .push_back(payload.clone());
        }
        Ok(payload)
    }

    /// Wait up to `timeout` for `take` to yield a payload.
    async fn wait_for<F>(&self, timeout: Duration, take: F) -> AppResult<Option<String>>
    where
        F: Fn() -> AppResult<Option<String>>,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            // Register interest before checking so a push between the check
            // and the wait is not missed.
            let notified = self.pushed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(payload) = take()? {
                return Ok(Some(payload));
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return take();
            }
        }
    }
}

#[async_trait]
impl JobBroker for MemoryBroker {
    async fn push(&self, queue: &str, payload: &str) -> AppResult<()> {
        self.lock()?
            .entry(queue.to_string())
            .or_default()
            .push_back(payload.to_string());
        self.pushed.notify_waiters();
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        self.wait_for(timeout, || self.try_pop(queue)).await
    }

    async fn reserve(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        self.wait_for(timeout, || self.try_reserve(queue)).await
    }

    async fn ack(&self, queue: &str, payload: &str) -> AppResult<()> {
        let mut queues = self.lock()?;
        if let Some(in_flight) = queues.get_mut(&in_flight_key(queue)) {
            if let Some(pos) = in_flight.iter().position(|p| p == payload) {
                in_flight.remove(pos);
            }
        }
        Ok(())
    }

    async fn requeue_in_flight(&self, queue: &str) -> AppResult<u64> {
        let moved = {
            let mut queues = self.lock()?;
            let in_flight = queues.remove(&in_flight_key(queue)).unwrap_or_default();
            let moved = in_flight.len() as u64;
            let waiting = queues.entry(queue.to_string()).or_default();
            for payload in in_flight.into_iter().rev() {
                waiting.push_front(payload);
            }
            moved
        };
        if moved > 0 {
            self.pushed.notify_waiters();
        }
        Ok(moved)
    }

    async fn publish(&self, key: &str, payload: &str, _ttl: Duration) -> AppResult<()> {
        self.push(key, payload).await
    }

    async fn len(&self, queue: &str) -> AppResult<u64> {
        Ok(self.lock()?.get(queue).map_or(0, |q| q.len() as u64))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let broker = MemoryBroker::new();
        broker.push("q", "a").await.unwrap();
        broker.push("q", "b").await.unwrap();
        assert_eq!(broker.len("q").await.unwrap(), 2);

        let timeout = Duration::from_millis(10);
        assert_eq!(broker.pop("q", timeout).await.unwrap().as_deref(), Some("a"));
        assert_eq!(broker.pop("q", timeout).await.unwrap().as_deref(), Some("b"));
        assert_eq!(broker.pop("q", timeout).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let broker = Arc::new(MemoryBroker::new());
        let waiter = {
            let broker = Arc::clone(&broker);
            tokio::spawn(async move { broker.pop("q", Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        broker.push("q", "job").await.unwrap();

        let popped = waiter.await.unwrap().unwrap();
        assert_eq!(popped.as_deref(), Some("job"));
    }

    #[tokio::test]
    async fn test_reserve_ack_and_requeue() {
        let broker = MemoryBroker::new();
        for payload in ["a", "b", "c"] {
            broker.push("q", payload).await.unwrap();
        }

        let timeout = Duration::from_millis(10);
        assert_eq!(broker.reserve("q", timeout).await.unwrap().as_deref(), Some("a"));
        assert_eq!(broker.reserve("q", timeout).await.unwrap().as_deref(), Some("b"));
        assert_eq!(broker.len("q").await.unwrap(), 1);
        assert_eq!(broker.len(&in_flight_key("q")).await.unwrap(), 2);

        broker.ack("q", "a").await.unwrap();
        assert_eq!(broker.len(&in_flight_key("q")).await.unwrap(), 1);

        // "b" was never acked and goes back in front of "c".
        assert_eq!(broker.requeue_in_flight("q").await.unwrap(), 1);
        assert_eq!(broker.len(&in_flight_key("q")).await.unwrap(), 0);
        assert_eq!(broker.pop("q", timeout).await.unwrap().as_deref(), Some("b"));
        assert_eq!(broker.pop("q", timeout).await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_queues_are_independent() {
        let broker = MemoryBroker::new();
        broker.push("a", "1").await.unwrap();
        assert_eq!(broker.len("b").await.unwrap(), 0);
        assert_eq!(broker.pop("b", Duration::ZERO).await.unwrap(), None);
    }
}
