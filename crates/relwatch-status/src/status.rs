//! Per-service status.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::message::{AnnounceStatus, ServiceInfo};
use crate::sinks::Sinks;

/// Version state of a service. Empty strings are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFields {
    pub latest_version: String,
    pub latest_version_timestamp: String,
    pub deployed_version: String,
    pub deployed_version_timestamp: String,
    pub approved_version: String,
    /// Last successful query. Never persisted.
    pub last_queried: String,
}

impl StatusFields {
    pub(crate) fn announce(&self) -> AnnounceStatus {
        AnnounceStatus {
            latest_version: self.latest_version.clone(),
            latest_version_timestamp: self.latest_version_timestamp.clone(),
            deployed_version: self.deployed_version.clone(),
            deployed_version_timestamp: self.deployed_version_timestamp.clone(),
            approved_version: self.approved_version.clone(),
            last_queried: self.last_queried.clone(),
        }
    }
}

/// Status of one service plus the sinks its changes go to.
///
/// Fields are only written through a [`crate::ChangeDispatcher`] (and
/// [`Status::restore`] at startup). Any number of readers may look at them.
#[derive(Debug)]
pub struct Status {
    service_id: String,
    service_url: String,
    web_url: String,
    pub(crate) fields: RwLock<StatusFields>,
    pub(crate) sinks: Sinks,
}

impl Status {
    pub fn new(service_id: impl Into<String>, sinks: Sinks) -> Self {
        Self {
            service_id: service_id.into(),
            service_url: String::new(),
            web_url: String::new(),
            fields: RwLock::new(StatusFields::default()),
            sinks,
        }
    }

    /// Set the URLs shown in notifications.
    pub fn with_urls(mut self, service_url: impl Into<String>, web_url: impl Into<String>) -> Self {
        self.service_url = service_url.into();
        self.web_url = web_url.into();
        self
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn latest_version(&self) -> String {
        self.fields.read().latest_version.clone()
    }

    pub fn deployed_version(&self) -> String {
        self.fields.read().deployed_version.clone()
    }

    pub fn approved_version(&self) -> String {
        self.fields.read().approved_version.clone()
    }

    pub fn last_queried(&self) -> String {
        self.fields.read().last_queried.clone()
    }

    /// Copy of all fields.
    pub fn snapshot(&self) -> StatusFields {
        self.fields.read().clone()
    }

    /// Seed fields loaded from storage. Nothing is sent to the sinks.
    pub fn restore(&self, restored: StatusFields) {
        let mut fields = self.fields.write();
        let last_queried = std::mem::take(&mut fields.last_queried);
        *fields = StatusFields {
            last_queried,
            ..restored
        };
    }

    /// Record a successful query.
    pub fn set_last_queried(&self) {
        self.fields.write().last_queried = now();
    }

    pub(crate) fn info(&self, fields: &StatusFields) -> ServiceInfo {
        ServiceInfo {
            id: self.service_id.clone(),
            url: self.service_url.clone(),
            web_url: self.web_url.clone(),
            latest_version: fields.latest_version.clone(),
            deployed_version: fields.deployed_version.clone(),
        }
    }

    /// Snapshot for notification templates.
    pub fn service_info(&self) -> ServiceInfo {
        self.info(&self.fields.read())
    }
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
