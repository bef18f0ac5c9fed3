//! Delivery transport trait.

use async_trait::async_trait;

use commons_core::result::AppResult;

use crate::message::EmailMessage;

/// Delivers a single message to an external mail service.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Return the transport type identifier (e.g., "sendgrid").
    fn transport_type(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}
