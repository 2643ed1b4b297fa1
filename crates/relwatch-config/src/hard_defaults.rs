//! Built-in defaults, the last override layer.

use std::collections::BTreeMap;

use crate::overrides::StringMap;
use crate::schema::{
    Defaults, LookupSettings, NotifyConfig, ServiceDefaults, ServiceOptions, WebHookConfig,
};

/// Notifier types the hard defaults know about.
pub const KNOWN_NOTIFY_TYPES: &[&str] = &[
    "bark",
    "discord",
    "generic",
    "googlechat",
    "gotify",
    "ifttt",
    "join",
    "mattermost",
    "matrix",
    "ntfy",
    "opsgenie",
    "pushbullet",
    "pushover",
    "rocketchat",
    "slack",
    "smtp",
    "teams",
    "telegram",
    "zulip",
];

fn map(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn notify_hard_default(kind: &str) -> NotifyConfig {
    let options = map(&[
        ("delay", "0s"),
        ("max_tries", "3"),
        ("message", "{{ service_id }} - {{ version }} released"),
    ]);
    let params = match kind {
        "gotify" => map(&[("title", "relwatch"), ("priority", "0")]),
        "ntfy" => map(&[("title", "relwatch"), ("priority", "default")]),
        "pushover" => map(&[("title", "relwatch"), ("priority", "0")]),
        "opsgenie" => map(&[("title", "relwatch"), ("priority", "P3")]),
        "smtp" => map(&[("subject", "relwatch"), ("usehtml", "false")]),
        "slack" | "discord" | "mattermost" | "rocketchat" => {
            map(&[("title", "relwatch"), ("username", "relwatch")])
        }
        _ => map(&[("title", "relwatch")]),
    };

    NotifyConfig {
        kind: kind.to_string(),
        options,
        url_fields: StringMap::new(),
        params,
    }
}

/// The built-in defaults.
pub fn hard_defaults() -> Defaults {
    let notify: BTreeMap<String, NotifyConfig> = KNOWN_NOTIFY_TYPES
        .iter()
        .map(|kind| (kind.to_string(), notify_hard_default(kind)))
        .collect();

    Defaults {
        service: ServiceDefaults {
            options: ServiceOptions {
                active: Some(true),
                interval: Some("10m".to_string()),
                semantic_versioning: Some(true),
                timeout: Some("30s".to_string()),
            },
            latest_version: LookupSettings {
                access_token: None,
                allow_invalid_certs: Some(false),
                use_prerelease: Some(false),
            },
            deployed_version: LookupSettings {
                access_token: None,
                allow_invalid_certs: Some(false),
                use_prerelease: None,
            },
        },
        notify,
        webhook: WebHookConfig {
            kind: "github".to_string(),
            options: map(&[
                ("delay", "0s"),
                ("max_tries", "3"),
                ("desired_status_code", "0"),
                ("allow_invalid_certs", "false"),
            ]),
            custom_headers: StringMap::new(),
        },
    }
}
