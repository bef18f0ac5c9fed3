//! Integration tests for the mail queue over the in-memory broker.

use std::sync::Arc;
use std::time::Duration;

use commons::ErrorKind;
use commons::workers::broker::MemoryBroker;
use commons::workers::{EmailMessage, MailQueue, QueueEvent, QueueSettings, SendValidation};

use crate::helpers::RecordingTransport;

fn settings(validation: SendValidation) -> QueueSettings {
    QueueSettings {
        validation,
        poll_timeout: Duration::from_millis(20),
        ..QueueSettings::default()
    }
}

#[tokio::test]
async fn test_accepted_message_is_delivered_once() {
    let transport = Arc::new(RecordingTransport::default());
    let queue = MailQueue::start(
        Arc::new(MemoryBroker::new()),
        transport.clone(),
        settings(SendValidation::Legacy),
    );
    let mut events = queue.subscribe();

    // Legacy accepts a message without a sender when both bodies are set.
    let message = EmailMessage::new("ada@example.com")
        .with_subject("Report")
        .with_text("see attached")
        .with_html("<p>see attached</p>");
    let handle = queue.send(message).await.unwrap();
    let id = handle.id();

    assert_eq!(handle.outcome().await, Ok(()));
    assert_eq!(events.recv().await.unwrap(), QueueEvent::Completed(id));

    let sent = transport.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject.as_deref(), Some("Report"));

    queue.shutdown().await;
}

#[tokio::test]
async fn test_strict_policy_rejects_missing_sender() {
    let queue = MailQueue::start(
        Arc::new(MemoryBroker::new()),
        Arc::new(RecordingTransport::default()),
        settings(SendValidation::Strict),
    );

    let message = EmailMessage::new("ada@example.com")
        .with_text("hi")
        .with_html("<p>hi</p>");
    let err = queue.send(message).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(queue.pending_jobs().await.unwrap(), 0);

    queue.shutdown().await;
}
