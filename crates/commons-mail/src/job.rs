//! Queued email jobs, their published outcomes, and completion handles.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use commons_core::traits::JobBroker;

use crate::message::EmailMessage;

/// A message as stored in the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Job identifier.
    pub id: Uuid,
    /// Message to deliver.
    pub message: EmailMessage,
    /// When the job was enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl EmailJob {
    /// Wrap a message in a new job.
    pub fn new(message: EmailMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            enqueued_at: Utc::now(),
        }
    }
}

/// Broker key under which the outcome of job `id` is published.
pub fn result_key(queue: &str, id: Uuid) -> String {
    format!("{queue}:result:{id}")
}

/// Outcome record published by whichever worker handled a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum JobOutcome {
    Completed,
    Failed { reason: String },
}

impl From<JobOutcome> for Result<(), JobError> {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Completed => Ok(()),
            JobOutcome::Failed { reason } => Err(JobError::Failed(reason)),
        }
    }
}

/// Why a job did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The transport rejected the message.
    #[error("{0}")]
    Failed(String),
    /// The local queue shut down before the job reported an outcome.
    #[error("Job was dropped before completion")]
    Dropped,
    /// No outcome was published within the result timeout.
    #[error("Timed out waiting for the job outcome")]
    TimedOut,
    /// The broker failed while the outcome was awaited.
    #[error("Broker error while waiting for the job outcome: {0}")]
    Broker(String),
}

/// Resolves once with the outcome of one enqueued job.
///
/// The outcome is read from the broker, so it arrives no matter which
/// queue instance's worker delivered the job.
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    broker: Arc<dyn JobBroker>,
    key: String,
    poll_timeout: Duration,
    result_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl JobHandle {
    pub(crate) fn new(
        id: Uuid,
        broker: Arc<dyn JobBroker>,
        queue: &str,
        poll_timeout: Duration,
        result_timeout: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            id,
            broker,
            key: result_key(queue, id),
            poll_timeout,
            result_timeout,
            shutdown,
        }
    }

    /// Identifier of the enqueued job.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the job to complete or fail.
    ///
    /// Gives up with `JobError::TimedOut` after the result timeout and with
    /// `JobError::Dropped` once the local queue has shut down.
    pub async fn outcome(self) -> Result<(), JobError> {
        let deadline = Instant::now() + self.result_timeout;

        loop {
            let wait = self
                .poll_timeout
                .min(deadline.saturating_duration_since(Instant::now()));

            match self.broker.pop(&self.key, wait).await {
                Ok(Some(payload)) => {
                    return match serde_json::from_str::<JobOutcome>(&payload) {
                        Ok(outcome) => outcome.into(),
                        Err(e) => Err(JobError::Broker(format!("Malformed job outcome: {e}"))),
                    };
                }
                Ok(None) => {}
                Err(e) => return Err(JobError::Broker(e.message)),
            }

            if *self.shutdown.borrow() {
                return Err(JobError::Dropped);
            }
            if Instant::now() >= deadline {
                return Err(JobError::TimedOut);
            }
        }
    }
}
