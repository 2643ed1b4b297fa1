//! Per-sender delivery state.

use dashmap::DashMap;

use crate::sender::SenderKind;

/// Whether the last delivery of each sender failed, keyed by
/// `(service_id, kind, sender_id)`. A notifier and a webhook may share an
/// id and still keep separate flags. A sender that never ran has no entry.
#[derive(Debug, Default)]
pub struct FailedTracker {
    flags: DashMap<(String, SenderKind, String), bool>,
}

impl FailedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, service_id: &str, kind: SenderKind, sender_id: &str, failed: bool) {
        self.flags
            .insert((service_id.to_string(), kind, sender_id.to_string()), failed);
    }

    pub fn get(&self, service_id: &str, kind: SenderKind, sender_id: &str) -> Option<bool> {
        self.flags
            .get(&(service_id.to_string(), kind, sender_id.to_string()))
            .map(|flag| *flag)
    }
}
