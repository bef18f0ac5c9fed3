//! Worker loop: pops jobs from the broker and delivers them.

use std::sync::Arc;

use tokio::time;

use crate::events::QueueEvent;
use crate::job::{self, EmailJob, JobOutcome};
use crate::queue::Shared;

/// The single consumer of a queue's job list.
#[derive(Debug)]
pub(crate) struct Worker {
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Run until the shutdown signal is raised.
    pub(crate) async fn run(self) {
        let mut shutdown = self.shared.shutdown.subscribe();
        let mut paused = self.shared.paused.subscribe();
        let queue = self.shared.settings.queue_key.clone();
        let poll_timeout = self.shared.settings.poll_timeout;

        tracing::info!(queue = %queue, "Mail worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if *paused.borrow_and_update() {
                tokio::select! {
                    _ = shutdown.changed() => {}
                    _ = paused.wait_for(|p| !*p) => {}
                }
                continue;
            }

            // Reserve is not raced against shutdown so a reserved payload is
            // always delivered and acked before the loop exits.
            match self.shared.broker.reserve(&queue, poll_timeout).await {
                Ok(Some(payload)) => self.process(&payload).await,
                Ok(None) => tracing::trace!("No email jobs available"),
                Err(e) => {
                    self.shared.emit(QueueEvent::Error(e.message.clone()));
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = time::sleep(poll_timeout) => {}
                    }
                }
            }
        }

        tracing::info!(queue = %queue, "Mail worker stopped");
    }

    /// Deliver one reserved payload, ack it, then publish its outcome.
    async fn process(&self, payload: &str) {
        let job: EmailJob = match serde_json::from_str(payload) {
            Ok(job) => job,
            Err(e) => {
                self.shared
                    .emit(QueueEvent::Error(format!("Malformed email job: {e}")));
                self.ack(payload).await;
                return;
            }
        };

        tracing::debug!(job_id = %job.id, "Processing email job");

        let delivery = self.shared.transport.send(&job.message);
        tokio::pin!(delivery);

        let result = tokio::select! {
            result = &mut delivery => result,
            _ = time::sleep(self.shared.settings.stall_timeout) => {
                self.shared.emit(QueueEvent::Stalled(job.id));
                delivery.await
            }
        };

        let outcome = match result {
            Ok(()) => {
                self.shared.emit(QueueEvent::Completed(job.id));
                JobOutcome::Completed
            }
            Err(e) => {
                self.shared
                    .emit(QueueEvent::Failed(job.id, e.message.clone()));
                JobOutcome::Failed { reason: e.message }
            }
        };

        self.ack(payload).await;
        self.publish(&job, &outcome).await;
    }

    async fn ack(&self, payload: &str) {
        if let Err(e) = self
            .shared
            .broker
            .ack(&self.shared.settings.queue_key, payload)
            .await
        {
            self.shared.emit(QueueEvent::Error(e.message.clone()));
        }
    }

    /// Publish the outcome for whichever instance holds the job's handle.
    async fn publish(&self, job: &EmailJob, outcome: &JobOutcome) {
        let settings = &self.shared.settings;
        let key = job::result_key(&settings.queue_key, job.id);

        let published = match serde_json::to_string(outcome) {
            Ok(payload) => {
                self.shared
                    .broker
                    .publish(&key, &payload, settings.result_timeout)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = published {
            self.shared.emit(QueueEvent::Error(format!(
                "Failed to publish outcome of job {}: {}",
                job.id, e.message
            )));
        }
    }
}
