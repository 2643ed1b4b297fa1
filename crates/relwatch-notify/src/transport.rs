//! The send contract of notification backends.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use relwatch_config::StringMap;

use crate::error::SendError;

/// A fully resolved and templated notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyMessage {
    pub service_id: String,
    pub sender_id: String,
    /// Backend type, e.g. `slack`.
    pub kind: String,
    pub title: String,
    pub message: String,
    pub url_fields: StringMap,
    pub params: StringMap,
}

/// Delivers [`NotifyMessage`]s to a notification backend.
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    /// Transport name for logs.
    fn name(&self) -> &str;

    async fn send(&self, message: &NotifyMessage) -> Result<(), SendError>;
}

/// Writes notifications to the log.
pub struct LogTransport;

#[async_trait]
impl NotifyTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &NotifyMessage) -> Result<(), SendError> {
        info!(
            service = %message.service_id,
            notify = %message.sender_id,
            kind = %message.kind,
            title = %message.title,
            "[NOTIFY] {}",
            message.message
        );
        Ok(())
    }
}
