//! Redis list broker.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::Client;
use redis::aio::ConnectionManager;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use commons_core::config::QueueConfig;
use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;
use commons_core::traits::{JobBroker, in_flight_key};

/// Interval between `LPOP` / `LMOVE` attempts while waiting for a payload.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Broker storing jobs in Redis lists.
///
/// Jobs are added with `RPUSH`, reserved with `LMOVE` into
/// `<queue>:processing` and acked with `LREM`, so a job survives a worker
/// that dies mid-delivery.
#[derive(Debug, Clone)]
pub struct RedisBroker {
    /// Redis connection manager (reconnecting).
    conn: ConnectionManager,
}

impl RedisBroker {
    /// Connect using the queue configuration.
    ///
    /// Fails when the server cannot be reached within the configured
    /// connect timeout or does not answer `PING`.
    pub async fn connect(config: &QueueConfig) -> AppResult<Self> {
        let url = config.url();
        info!(url = %mask_redis_url(&url), "Connecting to Redis");

        let client = Client::open(url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Queue, "Failed to create Redis client", e)
        })?;

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                AppError::queue(format!(
                    "Timed out connecting to Redis after {}s",
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::with_source(ErrorKind::Queue, "Failed to connect to Redis", e))?;

        let broker = Self { conn };
        if !broker.health_check().await? {
            return Err(AppError::queue("Redis did not answer PING"));
        }

        info!("Successfully connected to Redis");
        Ok(broker)
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Queue, format!("Redis error: {e}"), e)
    }

    /// Run `attempt` every `POLL_INTERVAL` until it yields or `timeout` passes.
    async fn poll<F, Fut>(&self, timeout: Duration, mut attempt: F) -> AppResult<Option<String>>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = AppResult<Option<String>>>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(payload) = attempt(self.conn.clone()).await? {
                return Ok(Some(payload));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

#[async_trait]
impl JobBroker for RedisBroker {
    async fn push(&self, queue: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.rpush(queue, payload).await.map_err(Self::map_err)?;
        debug!(queue, "Pushed job");
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        self.poll(timeout, |mut conn| async move {
            let payload: Option<String> = conn.lpop(queue, None).await.map_err(Self::map_err)?;
            Ok(payload)
        })
        .await
    }

    async fn reserve(&self, queue: &str, timeout: Duration) -> AppResult<Option<String>> {
        let processing = in_flight_key(queue);
        self.poll(timeout, |mut conn| {
            let processing = processing.clone();
            async move {
                let payload: Option<String> = redis::cmd("LMOVE")
                    .arg(queue)
                    .arg(&processing)
                    .arg("LEFT")
                    .arg("RIGHT")
                    .query_async(&mut conn)
                    .await
                    .map_err(Self::map_err)?;
                Ok(payload)
            }
        })
        .await
    }

    async fn ack(&self, queue: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .lrem(in_flight_key(queue), 1, payload)
            .await
            .map_err(Self::map_err)?;
        if removed == 0 {
            warn!(queue, "Acked job was not in flight");
        }
        Ok(())
    }

    async fn requeue_in_flight(&self, queue: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let processing = in_flight_key(queue);
        let mut moved = 0;

        loop {
            let payload: Option<String> = redis::cmd("LMOVE")
                .arg(&processing)
                .arg(queue)
                .arg("RIGHT")
                .arg("LEFT")
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            if payload.is_none() {
                break;
            }
            moved += 1;
        }

        if moved > 0 {
            info!(queue, moved, "Requeued in-flight jobs");
        }
        Ok(moved)
    }

    async fn publish(&self, key: &str, payload: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(key)
            .arg(payload)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs().max(1))
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn len(&self, queue: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let len: u64 = conn.llen(queue).await.map_err(Self::map_err)?;
        Ok(len)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if at_pos > scheme_end {
            return format!("{}****@{}", &url[..scheme_end], &url[at_pos + 1..]);
        }
    }
    url.to_string()
}
