//! Common interface of notifiers and webhooks.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::Span;

use relwatch_status::ServiceInfo;

use crate::error::SendError;

/// Which table of a service a sender comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderKind {
    Notify,
    WebHook,
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notify => write!(f, "notify"),
            Self::WebHook => write!(f, "webhook"),
        }
    }
}

/// Something that is told about a new version.
#[async_trait]
pub trait Sender: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> SenderKind;

    /// Resolved wait before the first attempt.
    fn delay(&self) -> Duration;

    /// Resolved `max_tries`. `0` still means one attempt.
    fn max_tries(&self) -> u32;

    /// Span that log lines of this sender are emitted in.
    fn span(&self) -> &Span;

    /// One attempt.
    async fn send(&self, info: &ServiceInfo) -> Result<(), SendError>;
}
