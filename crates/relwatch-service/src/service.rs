//! One monitored service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, info_span, warn, Instrument, Span};

use relwatch_lookup::{DeployedVersionLookup, LatestVersionLookup, LookupError};
use relwatch_status::{Change, ChangeDispatcher, Status};

use crate::error::ServiceError;

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

/// Resolved scheduling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSchedule {
    pub active: bool,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ServiceSchedule {
    fn default() -> Self {
        Self {
            active: true,
            interval: Duration::from_secs(600),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Results of one check.
#[derive(Debug)]
pub struct CheckReport {
    pub latest: Result<Change, ServiceError>,
    /// `None` when the service has no deployed version lookup.
    pub deployed: Option<Result<Change, ServiceError>>,
}

#[derive(Debug)]
pub enum CheckOutcome {
    Checked(CheckReport),
    /// Another check of this service was still running.
    Skipped,
}

pub struct Service {
    id: String,
    schedule: ServiceSchedule,
    latest: LatestVersionLookup,
    deployed: Option<DeployedVersionLookup>,
    dispatcher: ChangeDispatcher,
    running: Mutex<()>,
    span: Span,
}

impl Service {
    pub fn new(status: Arc<Status>, latest: LatestVersionLookup) -> Self {
        let id = status.service_id().to_string();
        let span = info_span!("service", id = %id);
        Self {
            id,
            schedule: ServiceSchedule::default(),
            latest,
            deployed: None,
            dispatcher: ChangeDispatcher::new(status),
            running: Mutex::new(()),
            span,
        }
    }

    pub fn with_deployed(mut self, deployed: DeployedVersionLookup) -> Self {
        self.deployed = Some(deployed);
        self
    }

    pub fn with_schedule(mut self, schedule: ServiceSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schedule(&self) -> ServiceSchedule {
        self.schedule
    }

    pub fn status(&self) -> &Arc<Status> {
        self.dispatcher.status()
    }

    pub fn dispatcher(&self) -> &ChangeDispatcher {
        &self.dispatcher
    }

    /// Query the latest version without recording it.
    pub async fn query_latest(&self) -> Result<String, LookupError> {
        let current = self.status().latest_version();
        self.latest
            .query(&current, self.schedule.timeout)
            .instrument(self.span.clone())
            .await
    }

    /// Query the deployed version without recording it.
    pub async fn query_deployed(&self) -> Option<Result<String, LookupError>> {
        let deployed = self.deployed.as_ref()?;
        Some(
            deployed
                .query(self.schedule.timeout)
                .instrument(self.span.clone())
                .await,
        )
    }

    /// Query both versions and dispatch what changed.
    ///
    /// Returns [`CheckOutcome::Skipped`] without waiting when a check of
    /// this service is already running.
    pub async fn check(&self) -> CheckOutcome {
        let Ok(_running) = self.running.try_lock() else {
            debug!(parent: &self.span, "Check already running, skipped");
            return CheckOutcome::Skipped;
        };

        async {
            let latest = self.check_latest().await;
            if let Err(ref e) = latest {
                warn!(error = %e, "Latest version check failed");
            }

            let deployed = match self.deployed {
                Some(ref lookup) => {
                    let result = self.check_deployed(lookup).await;
                    if let Err(ref e) = result {
                        warn!(error = %e, "Deployed version check failed");
                    }
                    Some(result)
                }
                None => None,
            };

            CheckOutcome::Checked(CheckReport { latest, deployed })
        }
        .instrument(self.span.clone())
        .await
    }

    async fn check_latest(&self) -> Result<Change, ServiceError> {
        let current = self.status().latest_version();
        let candidate = self.latest.query(&current, self.schedule.timeout).await?;
        self.status().set_last_queried();

        let change = self.dispatcher.latest_version(&candidate).await?;
        if let Change::Changed { ref previous } = change {
            info!(%previous, latest = %candidate, "New version");
        }
        Ok(change)
    }

    async fn check_deployed(&self, lookup: &DeployedVersionLookup) -> Result<Change, ServiceError> {
        let version = lookup.query(self.schedule.timeout).await?;
        let change = self.dispatcher.deployed_version(&version).await?;
        if change.is_changed() {
            info!(deployed = %version, "Deployed version changed");
        }
        Ok(change)
    }

    /// Check, then sleep `interval`, until `shutdown` fires.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        if !self.schedule.active {
            info!(parent: &self.span, "Service inactive");
            return;
        }
        info!(parent: &self.span, interval = ?self.schedule.interval, "Service started");

        loop {
            self.check().await;

            tokio::select! {
                _ = shutdown.recv() => {
                    info!(parent: &self.span, "Service stopping");
                    break;
                }
                _ = tokio::time::sleep(self.schedule.interval) => {}
            }
        }
    }
}
