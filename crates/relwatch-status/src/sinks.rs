//! Bounded outbound queues.
//!
//! There is one sender set per process, cloned into every service, and one
//! receiver per sink handed to its single consumer. Sending waits while a
//! sink is full.

use tokio::sync::mpsc;

use crate::error::DispatchError;
use crate::message::{DbMessage, NotifyTrigger};

/// Sending side of the three sinks.
#[derive(Debug, Clone)]
pub struct Sinks {
    persist: mpsc::Sender<DbMessage>,
    announce: mpsc::Sender<Vec<u8>>,
    notify: mpsc::Sender<NotifyTrigger>,
}

/// Receiving side of the three sinks.
#[derive(Debug)]
pub struct SinkReceivers {
    pub persist: mpsc::Receiver<DbMessage>,
    pub announce: mpsc::Receiver<Vec<u8>>,
    pub notify: mpsc::Receiver<NotifyTrigger>,
}

impl Sinks {
    /// Create the sinks, each holding up to `capacity` messages.
    pub fn new(capacity: usize) -> (Self, SinkReceivers) {
        let capacity = capacity.max(1);
        let (persist_tx, persist_rx) = mpsc::channel(capacity);
        let (announce_tx, announce_rx) = mpsc::channel(capacity);
        let (notify_tx, notify_rx) = mpsc::channel(capacity);
        (
            Self {
                persist: persist_tx,
                announce: announce_tx,
                notify: notify_tx,
            },
            SinkReceivers {
                persist: persist_rx,
                announce: announce_rx,
                notify: notify_rx,
            },
        )
    }

    pub async fn persist(&self, message: DbMessage) -> Result<(), DispatchError> {
        self.persist
            .send(message)
            .await
            .map_err(|_| DispatchError::SinkClosed("persist"))
    }

    pub async fn announce(&self, message: Vec<u8>) -> Result<(), DispatchError> {
        self.announce
            .send(message)
            .await
            .map_err(|_| DispatchError::SinkClosed("announce"))
    }

    pub async fn notify(&self, trigger: NotifyTrigger) -> Result<(), DispatchError> {
        self.notify
            .send(trigger)
            .await
            .map_err(|_| DispatchError::SinkClosed("notify"))
    }
}
