//! Service and version lookup configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{put, NotifyConfig, WebHookConfig};
use crate::overrides::StringMap;

/// One monitored service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Free-form note shown alongside the service.
    #[serde(default)]
    pub comment: Option<String>,

    /// Link for the service, may contain template placeholders.
    #[serde(default)]
    pub web_url: Option<String>,

    #[serde(default)]
    pub options: ServiceOptions,

    #[serde(default)]
    pub latest_version: LatestVersionConfig,

    #[serde(default)]
    pub deployed_version: Option<DeployedVersionConfig>,

    /// Notifiers by id. Ids matching a top-level `[notify.<id>]` borrow from it.
    #[serde(default)]
    pub notify: BTreeMap<String, NotifyConfig>,

    /// Webhooks by id. Ids matching a top-level `[webhook.<id>]` borrow from it.
    #[serde(default)]
    pub webhook: BTreeMap<String, WebHookConfig>,
}

/// Scheduling options of a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceOptions {
    #[serde(default)]
    pub active: Option<bool>,

    /// Time between checks, e.g. `10m`.
    #[serde(default)]
    pub interval: Option<String>,

    /// Require versions to parse as semantic versions and only move forward.
    #[serde(default)]
    pub semantic_versioning: Option<bool>,

    /// Timeout of each fetch, e.g. `30s`.
    #[serde(default)]
    pub timeout: Option<String>,
}

impl ServiceOptions {
    /// This entity's values as an override layer.
    pub fn as_layer(&self) -> StringMap {
        let mut layer = StringMap::new();
        put(&mut layer, "active", self.active.as_ref());
        put(&mut layer, "interval", self.interval.as_ref());
        put(&mut layer, "semantic_versioning", self.semantic_versioning.as_ref());
        put(&mut layer, "timeout", self.timeout.as_ref());
        layer
    }
}

/// Lookup settings that can come from defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupSettings {
    /// Token sent to the GitHub API.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub allow_invalid_certs: Option<bool>,

    /// Consider GitHub prereleases.
    #[serde(default)]
    pub use_prerelease: Option<bool>,
}

impl LookupSettings {
    /// This entity's values as an override layer.
    pub fn as_layer(&self) -> StringMap {
        let mut layer = StringMap::new();
        put(&mut layer, "access_token", self.access_token.as_ref());
        put(&mut layer, "allow_invalid_certs", self.allow_invalid_certs.as_ref());
        put(&mut layer, "use_prerelease", self.use_prerelease.as_ref());
        layer
    }
}

/// Where and how the latest version is found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestVersionConfig {
    /// `github` or `url`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// `owner/repo` (or a github.com URL) for `github`, any URL for `url`.
    #[serde(default)]
    pub url: String,

    #[serde(flatten)]
    pub settings: LookupSettings,

    /// Steps turning the fetched text into a version.
    #[serde(default)]
    pub url_commands: Vec<UrlCommandConfig>,

    #[serde(default)]
    pub require: Option<RequireConfig>,
}

impl LatestVersionConfig {
    /// `(owner, repo)` of a `github` lookup. Accepts `owner/repo` and
    /// `https://github.com/owner/repo`.
    pub fn github_repo(&self) -> Option<(&str, &str)> {
        let url = self.url.trim();
        let repo = url
            .strip_prefix("https://github.com/")
            .or_else(|| url.strip_prefix("http://github.com/"))
            .unwrap_or(url)
            .trim_end_matches('/');
        let mut parts = repo.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None)
                if !owner.is_empty() && !name.is_empty() && !owner.contains(':') =>
            {
                Some((owner, name.trim_end_matches(".git")))
            }
            _ => None,
        }
    }
}

/// One filter step as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UrlCommandConfig {
    /// Extract a capture group of a regex match.
    Regex {
        regex: String,
        #[serde(default)]
        group: Option<usize>,
        /// Which match to use; negative counts from the end.
        #[serde(default)]
        index: i64,
    },
    /// Replace every match of `regex` with `new`.
    Replace {
        regex: String,
        #[serde(default)]
        new: String,
    },
    /// Split on `text` and keep the piece at `index`.
    Split {
        text: String,
        #[serde(default)]
        index: i64,
    },
    /// Gate: `regex` must (or with `negate`, must not) match the raw content.
    Require {
        regex: String,
        #[serde(default)]
        negate: bool,
    },
}

/// Requirements a release must meet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequireConfig {
    /// Must match the fetched content before extraction.
    #[serde(default)]
    pub regex_content: Option<String>,

    /// Must match the extracted version.
    #[serde(default)]
    pub regex_version: Option<String>,
}

/// Where the currently deployed version is read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployedVersionConfig {
    pub url: String,

    /// Dot path into a JSON body, e.g. `data.version` or `items.0.tag`.
    #[serde(default)]
    pub json: Option<String>,

    /// Regex applied to the (JSON-extracted) value.
    #[serde(default)]
    pub regex: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,

    #[serde(default)]
    pub allow_invalid_certs: Option<bool>,
}

impl DeployedVersionConfig {
    /// This entity's values as an override layer.
    pub fn as_layer(&self) -> StringMap {
        let mut layer = StringMap::new();
        put(&mut layer, "allow_invalid_certs", self.allow_invalid_certs.as_ref());
        layer
    }
}

/// HTTP basic credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    #[serde(default)]
    pub password: String,
}
