//! Messages carried by the sinks.

use serde::{Deserialize, Serialize};

/// A persisted status column. Column names only ever come from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    LatestVersion,
    LatestVersionTimestamp,
    DeployedVersion,
    DeployedVersionTimestamp,
    ApprovedVersion,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::LatestVersion,
        Column::LatestVersionTimestamp,
        Column::DeployedVersion,
        Column::DeployedVersionTimestamp,
        Column::ApprovedVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::LatestVersion => "latest_version",
            Column::LatestVersionTimestamp => "latest_version_timestamp",
            Column::DeployedVersion => "deployed_version",
            Column::DeployedVersionTimestamp => "deployed_version_timestamp",
            Column::ApprovedVersion => "approved_version",
        }
    }
}

/// One persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub column: Column,
    pub value: String,
}

impl Cell {
    pub fn new(column: Column, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Persist sink message: cells to upsert for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbMessage {
    pub service_id: String,
    pub cells: Vec<Cell>,
}

/// What templates and senders know about a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub id: String,
    /// URL the latest version is looked up at.
    pub url: String,
    /// Link for humans, may contain template placeholders.
    pub web_url: String,
    pub latest_version: String,
    pub deployed_version: String,
}

/// Notify sink message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTrigger {
    pub info: ServiceInfo,
}

/// Announce sub type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnounceKind {
    /// A new latest version.
    New,
    /// The deployed version changed.
    Updated,
    /// A version was approved.
    Action,
}

/// Status fields sent to announce consumers. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub latest_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub latest_version_timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deployed_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deployed_version_timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub approved_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_queried: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceServiceData {
    pub id: String,
    pub status: AnnounceStatus,
}

/// Announce sink payload, serialized to JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceMessage {
    pub page: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_type: AnnounceKind,
    pub service_data: AnnounceServiceData,
}

impl AnnounceMessage {
    pub fn version(sub_type: AnnounceKind, id: impl Into<String>, status: AnnounceStatus) -> Self {
        Self {
            page: "APPROVALS".to_string(),
            kind: "VERSION".to_string(),
            sub_type,
            service_data: AnnounceServiceData {
                id: id.into(),
                status,
            },
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // Plain structs of strings always serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }
}
