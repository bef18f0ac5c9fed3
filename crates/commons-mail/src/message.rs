//! Email message model and field-presence validation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use commons_core::error::AppError;
use commons_core::result::AppResult;

/// Message returned when a message fails validation.
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please specify all require email options! (to, from, text or html)";

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64 encoded contents.
    pub content: String,
    /// File name shown to the recipient.
    pub filename: String,
    /// MIME type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// `attachment` or `inline`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
}

/// One email to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipients.
    #[serde(default)]
    pub to: Vec<String>,
    /// Sender address.
    #[serde(default)]
    pub from: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Plain text body.
    #[serde(default)]
    pub text: Option<String>,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Blind carbon copy recipients.
    #[serde(default)]
    pub bcc: Vec<String>,
    /// Attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Delivery API categories.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl EmailMessage {
    /// Start a message to a single recipient.
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            to: vec![recipient.into()],
            ..Self::default()
        }
    }

    /// Set the sender.
    pub fn with_from(mut self, sender: impl Into<String>) -> Self {
        self.from = Some(sender.into());
        self
    }

    /// Set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain text body.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the HTML body.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    fn has_to(&self) -> bool {
        self.to.iter().any(|r| !r.is_empty())
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

/// Field-presence policy applied before a message is enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendValidation {
    /// Accept iff `to && (from || (text && html))`.
    ///
    /// A message without a sender passes only when it carries both
    /// bodies, and a message with a sender passes with no body at all.
    #[default]
    Legacy,
    /// Require `to`, `from`, and at least one of `text` / `html`.
    Strict,
}

impl SendValidation {
    /// Check a message against this policy.
    pub fn check(&self, message: &EmailMessage) -> AppResult<()> {
        let has_from = present(&message.from);
        let has_text = present(&message.text);
        let has_html = present(&message.html);

        let accepted = match self {
            Self::Legacy => message.has_to() && (has_from || (has_text && has_html)),
            Self::Strict => message.has_to() && has_from && (has_text || has_html),
        };

        if accepted {
            Ok(())
        } else {
            Err(AppError::validation(MISSING_FIELDS_MESSAGE))
        }
    }
}

impl FromStr for SendValidation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(AppError::configuration(format!(
                "Unknown mail validation policy: '{other}'. Supported: legacy, strict"
            ))),
        }
    }
}
