//! # relwatch Status
//!
//! Per-service status and the fan-out of its changes.
//!
//! Every process has one set of [`Sinks`] (persist, announce, notify), each
//! a bounded queue with a single consumer. A [`ChangeDispatcher`] compares a
//! candidate version with the [`Status`] of its service and, when it differs,
//! records it and sends one message to each sink.

mod dispatcher;
mod error;
mod message;
mod sinks;
mod status;

pub use dispatcher::{Change, ChangeDispatcher};
pub use error::DispatchError;
pub use message::{
    AnnounceKind, AnnounceMessage, AnnounceServiceData, AnnounceStatus, Cell, Column, DbMessage,
    NotifyTrigger, ServiceInfo,
};
pub use sinks::{SinkReceivers, Sinks};
pub use status::{Status, StatusFields};
