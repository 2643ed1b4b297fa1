//! Notifier and webhook configuration types.

use serde::{Deserialize, Serialize};

use super::string_map;
use crate::overrides::StringMap;

/// A notifier.
///
/// The same shape is used at every layer: inside a service, at top level
/// (`main`), under `[defaults.notify.<type>]` and in the hard defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Backend type, e.g. `slack`. Falls back to the main's type, then the id.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Behaviour: `delay`, `max_tries`, `message`.
    #[serde(default, deserialize_with = "string_map::deserialize")]
    pub options: StringMap,

    /// Parts of the backend URL: host, token, channel, ...
    #[serde(default, deserialize_with = "string_map::deserialize")]
    pub url_fields: StringMap,

    /// Query parameters of the backend: `title`, `priority`, ...
    #[serde(default, deserialize_with = "string_map::deserialize")]
    pub params: StringMap,
}

/// A webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebHookConfig {
    /// Payload flavour. Only `github` exists.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// `url`, `secret`, `delay`, `max_tries`, `desired_status_code`,
    /// `allow_invalid_certs`.
    #[serde(default, deserialize_with = "string_map::deserialize")]
    pub options: StringMap,

    /// Extra request headers. Values may contain template placeholders.
    #[serde(default, deserialize_with = "string_map::deserialize")]
    pub custom_headers: StringMap,
}
