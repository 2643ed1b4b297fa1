//! # relwatch Notify
//!
//! Tells the outside world about new versions.
//!
//! A service owns any number of senders: [`Notifier`]s, which hand a fully
//! resolved [`NotifyMessage`] to a [`NotifyTransport`], and [`WebHook`]s,
//! which POST a GitHub-style push event. [`NotificationDispatch`] consumes
//! the notify sink, runs the senders of a service concurrently with their
//! delay and retries, and records which ones failed.

mod dispatch;
mod error;
mod failed;
mod notifier;
mod sender;
mod template;
mod transport;
mod webhook;

pub use dispatch::{DispatchReport, NotificationDispatch};
pub use error::SendError;
pub use failed::FailedTracker;
pub use notifier::Notifier;
pub use sender::{Sender, SenderKind};
pub use template::render;
pub use transport::{LogTransport, NotifyMessage, NotifyTransport};
pub use webhook::WebHook;
