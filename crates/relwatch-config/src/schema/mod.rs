//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::duration::parse_duration;
use crate::overrides::StringMap;

mod schema_notify;
mod schema_service;

pub use schema_notify::*;
pub use schema_service::*;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    /// User defaults, the third override layer.
    #[serde(default)]
    pub defaults: Defaults,

    /// Top-level notifiers that services reference by id (`main` layer).
    #[serde(default)]
    pub notify: BTreeMap<String, NotifyConfig>,

    /// Top-level webhooks that services reference by id (`main` layer).
    #[serde(default)]
    pub webhook: BTreeMap<String, WebHookConfig>,

    /// Monitored services by id.
    #[serde(default)]
    pub service: BTreeMap<String, ServiceConfig>,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory for the database and log files. `~` is expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Database file, relative to `data_dir` unless absolute.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of each outbound sink.
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,

    /// Pause between send attempts of one notifier/webhook.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: String,

    /// GitHub REST API base URL.
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
}

fn default_data_dir() -> String {
    "~/.relwatch".to_string()
}

fn default_database_file() -> String {
    "relwatch.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sink_capacity() -> usize {
    32
}

fn default_retry_interval() -> String {
    "10s".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            log_level: default_log_level(),
            sink_capacity: default_sink_capacity(),
            retry_interval: default_retry_interval(),
            github_api_base: default_github_api_base(),
        }
    }
}

impl Settings {
    /// Expanded data directory.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).as_ref())
    }

    /// Full path of the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        let file = PathBuf::from(shellexpand::tilde(&self.database_file).as_ref());
        if file.is_absolute() {
            file
        } else {
            self.data_dir().join(file)
        }
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Parsed `retry_interval`, falling back to 10s.
    pub fn retry_interval(&self) -> Duration {
        parse_duration(&self.retry_interval).unwrap_or(Duration::from_secs(10))
    }
}

/// User defaults for every entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub service: ServiceDefaults,

    /// Notifier defaults keyed by notifier type.
    #[serde(default)]
    pub notify: BTreeMap<String, NotifyConfig>,

    #[serde(default)]
    pub webhook: WebHookConfig,
}

/// Service-level defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDefaults {
    #[serde(default)]
    pub options: ServiceOptions,

    #[serde(default)]
    pub latest_version: LookupSettings,

    #[serde(default)]
    pub deployed_version: LookupSettings,
}

/// Accepts string, integer, float or boolean values for string maps so that
/// `max_tries = 3` reads the same as `max_tries = "3"`.
pub(crate) mod string_map {
    use serde::{Deserialize, Deserializer};
    use std::collections::HashMap;

    use super::StringMap;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Str(s) => s,
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Bool(b) => b.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<StringMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, Scalar>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(k, v)| (k, v.into_string())).collect())
    }
}

/// Insert `value` under `key` when set.
pub(crate) fn put<T: ToString>(layer: &mut StringMap, key: &str, value: Option<&T>) {
    if let Some(value) = value {
        layer.insert(key.to_string(), value.to_string());
    }
}
