//! Email job queue for the commons crates.
//!
//! This crate provides:
//! - A message model with a named field-presence validation policy
//! - Job brokers (Redis, in-memory) behind the `JobBroker` trait
//! - A SendGrid delivery transport behind the `MailTransport` trait
//! - A single worker, started at initialization, that delivers queued
//!   jobs and reports each outcome through a `JobHandle`

pub mod broker;
pub mod events;
pub mod job;
pub mod message;
pub mod queue;
pub mod sendgrid;
pub mod transport;
mod worker;

pub use events::QueueEvent;
pub use job::{EmailJob, JobError, JobHandle};
pub use message::{Attachment, EmailMessage, SendValidation};
pub use queue::{MailQueue, QueueSettings};
pub use sendgrid::SendGridClient;
pub use transport::MailTransport;
