//! Lookup errors.

use thiserror::Error;

/// Why a version could not be obtained.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network failure, timeout or undecodable body. Retryable, the cache is
    /// left untouched.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The server answered with a status we do not handle.
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The extracted version failed a requirement.
    #[error("Version {version:?} rejected: {reason}")]
    VersionRejected { version: String, reason: String },

    /// The candidate is older than the version already recorded.
    #[error("Version {candidate:?} is older than {current:?}")]
    OlderVersion { candidate: String, current: String },

    /// No usable release in the API response.
    #[error("No releases found")]
    NoReleases,

    /// A dot path did not lead to a scalar in the JSON body.
    #[error("JSON path {path:?}: {message}")]
    JsonPath { path: String, message: String },

    #[error("Invalid lookup configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::Fetch(e.to_string())
    }
}

/// Why the filter pipeline rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A `require` step did not hold on the raw content.
    #[error("Requirement {regex:?} not met")]
    GateFailed { regex: String },

    #[error("No match for {regex:?}")]
    NoMatch { regex: String },

    #[error("Index {index} out of range for {len} item(s)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Empty version")]
    Empty,

    #[error("Invalid regex {regex:?}: {message}")]
    InvalidRegex { regex: String, message: String },
}
