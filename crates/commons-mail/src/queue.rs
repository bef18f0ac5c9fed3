//! The mail queue: validates and enqueues messages, owns the worker.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use commons_core::config::{MailConfig, QueueConfig};
use commons_core::error::AppError;
use commons_core::result::AppResult;
use commons_core::traits::{JobBroker, in_flight_key};

use crate::broker::RedisBroker;
use crate::events::QueueEvent;
use crate::job::{EmailJob, JobHandle};
use crate::message::{EmailMessage, SendValidation};
use crate::sendgrid::SendGridClient;
use crate::transport::MailTransport;
use crate::worker::Worker;

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Runtime settings of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Broker key of the job list.
    pub queue_key: String,
    /// Policy applied in `send`.
    pub validation: SendValidation,
    /// How long one broker pop waits for a job.
    pub poll_timeout: Duration,
    /// Delivery time after which a job is reported as stalled.
    pub stall_timeout: Duration,
    /// How long a handle waits for an outcome, and how long a published
    /// outcome is kept by the broker.
    pub result_timeout: Duration,
}

impl QueueSettings {
    /// Derive settings from configuration.
    pub fn from_config(queue: &QueueConfig, mail: &MailConfig) -> AppResult<Self> {
        Ok(Self {
            queue_key: queue.queue_key(),
            validation: mail.validation.parse()?,
            poll_timeout: Duration::from_secs(queue.poll_timeout_seconds),
            stall_timeout: Duration::from_secs(queue.stall_timeout_seconds),
            result_timeout: Duration::from_secs(queue.result_timeout_seconds),
        })
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            queue_key: QueueConfig::default().queue_key(),
            validation: SendValidation::default(),
            poll_timeout: Duration::from_secs(1),
            stall_timeout: Duration::from_secs(30),
            result_timeout: Duration::from_secs(300),
        }
    }
}

/// State shared between the queue handle and its worker.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) broker: Arc<dyn JobBroker>,
    pub(crate) transport: Arc<dyn MailTransport>,
    pub(crate) settings: QueueSettings,
    pub(crate) events: broadcast::Sender<QueueEvent>,
    pub(crate) paused: watch::Sender<bool>,
    pub(crate) shutdown: watch::Sender<bool>,
}

impl Shared {
    /// Log an event and publish it to subscribers.
    pub(crate) fn emit(&self, event: QueueEvent) {
        event.log();
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Email job queue with a single background worker.
///
/// The worker is spawned once, when the queue is created. Each `send`
/// enqueues exactly one job and returns a handle to its outcome. Several
/// queues may share one broker list; outcomes are published through the
/// broker so a handle resolves whichever worker delivered the job.
#[derive(Debug)]
pub struct MailQueue {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MailQueue {
    /// Connect to Redis, configure SendGrid, and start the worker.
    pub async fn initialize(queue: &QueueConfig, mail: &MailConfig) -> AppResult<Self> {
        let settings = QueueSettings::from_config(queue, mail)?;
        let broker = RedisBroker::connect(queue).await?;
        let transport = SendGridClient::new(mail)?;
        Ok(Self::start(Arc::new(broker), Arc::new(transport), settings))
    }

    /// Start a queue over an existing broker and transport.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        broker: Arc<dyn JobBroker>,
        transport: Arc<dyn MailTransport>,
        settings: QueueSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (paused, _) = watch::channel(false);
        let (shutdown, _) = watch::channel(false);

        info!(
            queue = %settings.queue_key,
            transport = transport.transport_type(),
            validation = ?settings.validation,
            "Starting mail queue"
        );

        let shared = Arc::new(Shared {
            broker,
            transport,
            settings,
            events,
            paused,
            shutdown,
        });

        let worker = tokio::spawn(Worker::new(Arc::clone(&shared)).run());
        shared.emit(QueueEvent::Ready);

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Validate and enqueue one message.
    pub async fn send(&self, message: EmailMessage) -> AppResult<JobHandle> {
        self.shared.settings.validation.check(&message)?;

        if *self.shared.shutdown.borrow() {
            return Err(AppError::service_unavailable("Mail queue is shut down"));
        }

        let job = EmailJob::new(message);
        let payload = serde_json::to_string(&job)?;
        let settings = &self.shared.settings;

        if let Err(e) = self.shared.broker.push(&settings.queue_key, &payload).await {
            self.shared.emit(QueueEvent::Error(e.message.clone()));
            return Err(e);
        }

        debug!(job_id = %job.id, "Email job enqueued");
        Ok(JobHandle::new(
            job.id,
            Arc::clone(&self.shared.broker),
            &settings.queue_key,
            settings.poll_timeout,
            settings.result_timeout,
            self.shared.shutdown.subscribe(),
        ))
    }

    /// Stop taking new jobs. In-flight deliveries finish.
    pub fn pause(&self) {
        if !self.shared.paused.send_replace(true) {
            self.shared.emit(QueueEvent::Paused);
        }
    }

    /// Resume taking jobs.
    pub fn resume(&self) {
        if self.shared.paused.send_replace(false) {
            self.shared.emit(QueueEvent::Resumed);
        }
    }

    /// Whether the queue is paused.
    pub fn is_paused(&self) -> bool {
        *self.shared.paused.borrow()
    }

    /// Receive queue events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    /// Number of jobs waiting in the broker.
    pub async fn pending_jobs(&self) -> AppResult<u64> {
        self.shared.broker.len(&self.shared.settings.queue_key).await
    }

    /// Number of jobs reserved by a worker and not yet acked.
    pub async fn in_flight_jobs(&self) -> AppResult<u64> {
        self.shared
            .broker
            .len(&in_flight_key(&self.shared.settings.queue_key))
            .await
    }

    /// Put jobs left in flight by a worker that died back on the queue.
    ///
    /// Only call this while no other worker consumes the same queue, or
    /// jobs it is delivering right now are delivered twice.
    pub async fn recover_in_flight(&self) -> AppResult<u64> {
        let moved = self
            .shared
            .broker
            .requeue_in_flight(&self.shared.settings.queue_key)
            .await?;
        if moved > 0 {
            warn!(moved, "Recovered in-flight email jobs");
        }
        Ok(moved)
    }

    /// Check whether the broker is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.shared.broker.health_check().await
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// A delivery in progress finishes first. Handles still waiting resolve
    /// with `JobError::Dropped`; their jobs stay in the broker.
    pub async fn shutdown(&self) {
        self.shared.shutdown.send_replace(true);

        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!("Mail worker terminated abnormally: {e}");
            }
        }

        info!("Mail queue shut down");
    }
}

impl Drop for MailQueue {
    fn drop(&mut self) {
        self.shared.shutdown.send_replace(true);
    }
}
