//! Change detection and fan-out.

use std::sync::Arc;

use tracing::debug;

use crate::error::DispatchError;
use crate::message::{AnnounceKind, AnnounceMessage, Cell, Column, DbMessage, NotifyTrigger};
use crate::status::{now, Status};

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

/// Outcome of offering a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Same as the recorded value. Nothing was sent.
    Unchanged,
    /// Recorded and sent to the sinks.
    Changed { previous: String },
}

impl Change {
    pub fn is_changed(&self) -> bool {
        matches!(self, Change::Changed { .. })
    }
}

/// Compares candidates with a [`Status`] and fans changes out to its sinks.
///
/// The field is updated under the write lock, the lock is released and then
/// each sink gets exactly one message. Sends wait while a sink is full.
#[derive(Debug, Clone)]
pub struct ChangeDispatcher {
    status: Arc<Status>,
}

/// Messages built while the lock is held.
struct Outbound {
    persist: DbMessage,
    announce: Vec<u8>,
    notify: Option<NotifyTrigger>,
}

impl ChangeDispatcher {
    pub fn new(status: Arc<Status>) -> Self {
        Self { status }
    }

    pub fn status(&self) -> &Arc<Status> {
        &self.status
    }

    /// Offer a new latest version. On change: persist, announce `NEW`, notify.
    pub async fn latest_version(&self, candidate: &str) -> Result<Change, DispatchError> {
        let (previous, outbound) = {
            let mut fields = self.status.fields.write();
            if fields.latest_version == candidate {
                return Ok(Change::Unchanged);
            }
            let previous = std::mem::replace(&mut fields.latest_version, candidate.to_string());
            fields.latest_version_timestamp = now();

            let outbound = Outbound {
                persist: DbMessage {
                    service_id: self.status.service_id().to_string(),
                    cells: vec![
                        Cell::new(Column::LatestVersion, &fields.latest_version),
                        Cell::new(Column::LatestVersionTimestamp, &fields.latest_version_timestamp),
                    ],
                },
                announce: AnnounceMessage::version(
                    AnnounceKind::New,
                    self.status.service_id(),
                    fields.announce(),
                )
                .to_bytes(),
                notify: Some(NotifyTrigger {
                    info: self.status.info(&fields),
                }),
            };
            (previous, outbound)
        };

        debug!(service = self.status.service_id(), %previous, latest = candidate, "New latest version");
        self.send(outbound).await?;
        Ok(Change::Changed { previous })
    }

    /// Offer a new deployed version. On change: persist, announce `UPDATED`.
    pub async fn deployed_version(&self, candidate: &str) -> Result<Change, DispatchError> {
        let (previous, outbound) = {
            let mut fields = self.status.fields.write();
            if fields.deployed_version == candidate {
                return Ok(Change::Unchanged);
            }
            let previous = std::mem::replace(&mut fields.deployed_version, candidate.to_string());
            fields.deployed_version_timestamp = now();

            let outbound = Outbound {
                persist: DbMessage {
                    service_id: self.status.service_id().to_string(),
                    cells: vec![
                        Cell::new(Column::DeployedVersion, &fields.deployed_version),
                        Cell::new(Column::DeployedVersionTimestamp, &fields.deployed_version_timestamp),
                    ],
                },
                announce: AnnounceMessage::version(
                    AnnounceKind::Updated,
                    self.status.service_id(),
                    fields.announce(),
                )
                .to_bytes(),
                notify: None,
            };
            (previous, outbound)
        };

        debug!(service = self.status.service_id(), %previous, deployed = candidate, "Deployed version changed");
        self.send(outbound).await?;
        Ok(Change::Changed { previous })
    }

    /// Record an approved version. On change: persist, announce `ACTION`.
    pub async fn approved_version(&self, version: &str) -> Result<Change, DispatchError> {
        let (previous, outbound) = {
            let mut fields = self.status.fields.write();
            if fields.approved_version == version {
                return Ok(Change::Unchanged);
            }
            let previous = std::mem::replace(&mut fields.approved_version, version.to_string());

            let outbound = Outbound {
                persist: DbMessage {
                    service_id: self.status.service_id().to_string(),
                    cells: vec![Cell::new(Column::ApprovedVersion, &fields.approved_version)],
                },
                announce: AnnounceMessage::version(
                    AnnounceKind::Action,
                    self.status.service_id(),
                    fields.announce(),
                )
                .to_bytes(),
                notify: None,
            };
            (previous, outbound)
        };

        self.send(outbound).await?;
        Ok(Change::Changed { previous })
    }

    async fn send(&self, outbound: Outbound) -> Result<(), DispatchError> {
        let sinks = &self.status.sinks;
        sinks.persist(outbound.persist).await?;
        sinks.announce(outbound.announce).await?;
        if let Some(trigger) = outbound.notify {
            sinks.notify(trigger).await?;
        }
        Ok(())
    }
}
