mod mailer;
mod outbox;

pub use mailer::{subject_for, validate_recipient, AdherenceMailer};
pub use outbox::OutboxDispatcher;

use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;

/// Email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub recipient: String,
    pub subject: String,
    pub content_type: String,
    pub html_body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub message_id: String,
    pub location: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),
    #[error("unable to spool message: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound transport for finished reports (mail relay, outbox, test double).
pub trait Dispatcher: Debug + Send + Sync {
    fn dispatch(&self, message: &OutgoingMessage) -> Result<DispatchReceipt, DispatchError>;
}
