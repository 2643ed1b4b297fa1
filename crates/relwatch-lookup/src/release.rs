//! GitHub release records.

use serde::{Deserialize, Serialize};

/// One entry of `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub published_at: Option<String>,
}

impl Release {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }
}
