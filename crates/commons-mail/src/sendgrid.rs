//! SendGrid v3 delivery transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use commons_core::config::MailConfig;
use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

use crate::message::{Attachment, EmailMessage};
use crate::transport::MailTransport;

/// Path of the send endpoint below the API base URL.
const SEND_PATH: &str = "/v3/mail/send";

/// Sends messages through the SendGrid HTTP API.
#[derive(Debug, Clone)]
pub struct SendGridClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridClient {
    /// Build a client from the mail configuration.
    ///
    /// A missing API key is reported but not fatal; deliveries will be
    /// rejected by the API until one is configured.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        if config.api_key.is_empty() {
            error!("No SendGrid API key configured, email delivery will fail");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}{SEND_PATH}", config.api_base_url.trim_end_matches('/')),
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for SendGridClient {
    fn transport_type(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let payload = SendPayload::from(message);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("SendGrid request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "SendGrid accepted message");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::external_service(format!(
            "SendGrid responded with {}: {body}",
            status.as_u16()
        )))
    }
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    personalizations: Vec<Personalization<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    attachments: &'a [Attachment],
    #[serde(skip_serializing_if = "is_empty_slice")]
    categories: &'a [String],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

fn addresses(list: &[String]) -> Vec<Address<'_>> {
    list.iter()
        .filter(|email| !email.is_empty())
        .map(|email| Address { email })
        .collect()
}

impl<'a> From<&'a EmailMessage> for SendPayload<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        let mut content = Vec::new();
        if let Some(text) = message.text.as_deref() {
            content.push(Content {
                content_type: "text/plain",
                value: text,
            });
        }
        if let Some(html) = message.html.as_deref() {
            content.push(Content {
                content_type: "text/html",
                value: html,
            });
        }

        Self {
            personalizations: vec![Personalization {
                to: addresses(&message.to),
                cc: addresses(&message.cc),
                bcc: addresses(&message.bcc),
            }],
            from: message.from.as_deref().map(|email| Address { email }),
            subject: message.subject.as_deref(),
            content,
            attachments: &message.attachments,
            categories: &message.categories,
        }
    }
}
