//! Queue lifecycle events.

use uuid::Uuid;

/// Something that happened on the mail queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// The broker is connected and the worker is running.
    Ready,
    /// A job was delivered.
    Completed(Uuid),
    /// The worker stopped taking jobs.
    Paused,
    /// The worker resumed taking jobs.
    Resumed,
    /// Delivery of a job is taking longer than the stall timeout.
    Stalled(Uuid),
    /// Delivery of a job failed.
    Failed(Uuid, String),
    /// The broker reported an error.
    Error(String),
}

impl QueueEvent {
    /// Write the event to the log.
    pub fn log(&self) {
        match self {
            Self::Ready => {
                tracing::info!("Redis is connected and the queue is ready to accept jobs")
            }
            Self::Completed(id) => tracing::info!("Email Job {id} succeeded"),
            Self::Paused => tracing::info!("The queue has been paused"),
            Self::Resumed => tracing::info!("The queue has been resumed"),
            Self::Stalled(id) => tracing::info!("Job {id} has been stalled"),
            Self::Failed(id, reason) => {
                tracing::error!("Email Job {id} failed with error {reason}")
            }
            Self::Error(message) => tracing::error!("A queue error happened: {message}"),
        }
    }
}
