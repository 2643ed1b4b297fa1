//! Configuration validation.
//!
//! Runs once at startup. Anything that would otherwise fail silently at
//! runtime (a regex that does not compile, an unparsable `max_tries`) is
//! reported here.

use regex::Regex;

use crate::duration::parse_duration;
use crate::error::ConfigError;
use crate::hard_defaults::{hard_defaults, KNOWN_NOTIFY_TYPES};
use crate::overrides::{effective_type, first_non_empty, OverrideChain};
use crate::schema::{
    Config, Defaults, DeployedVersionConfig, LatestVersionConfig, ServiceConfig,
    UrlCommandConfig,
};

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Whether any error was reported for `path`.
    pub fn has_error_at(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();
        let hard = hard_defaults();

        Self::validate_settings(config, &mut result);

        if config.service.is_empty() {
            result.add_warning(ValidationWarning::new(
                "service",
                "No services configured, nothing will be monitored",
            ));
        }

        for (id, service) in &config.service {
            let path = format!("service.{id}");
            Self::validate_options(config, &hard, service, &path, &mut result);
            Self::validate_latest_version(&service.latest_version, &path, &mut result);
            if let Some(ref deployed) = service.deployed_version {
                Self::validate_deployed_version(deployed, &path, &mut result);
            }
            Self::validate_notifiers(config, &hard, service, &path, &mut result);
            Self::validate_webhooks(config, &hard, service, &path, &mut result);

            if service.notify.is_empty() && service.webhook.is_empty() {
                result.add_warning(ValidationWarning::new(
                    path,
                    "No notifiers or webhooks, changes will only be recorded",
                ));
            }
        }

        Ok(result)
    }

    fn validate_settings(config: &Config, result: &mut ValidationResult) {
        if config.settings.sink_capacity == 0 {
            result.add_error(ValidationError::new(
                "settings.sink_capacity",
                "sink_capacity must be greater than 0",
            ));
        }

        if let Err(e) = parse_duration(&config.settings.retry_interval) {
            result.add_error(ValidationError::new("settings.retry_interval", e.to_string()));
        }

        if url::Url::parse(&config.settings.github_api_base).is_err() {
            result.add_error(ValidationError::new(
                "settings.github_api_base",
                format!("Invalid URL '{}'", config.settings.github_api_base),
            ));
        }
    }

    fn validate_options(
        config: &Config,
        hard: &Defaults,
        service: &ServiceConfig,
        path: &str,
        result: &mut ValidationResult,
    ) {
        let own = service.options.as_layer();
        let defaults = config.defaults.service.options.as_layer();
        let hard_layer = hard.service.options.as_layer();
        let chain = OverrideChain::new(&own)
            .with_defaults(Some(&defaults))
            .with_hard_defaults(Some(&hard_layer));

        match parse_duration(&chain.resolve("interval")) {
            Ok(interval) if interval.is_zero() => {
                result.add_error(ValidationError::new(
                    format!("{path}.options.interval"),
                    "interval must be greater than 0",
                ));
            }
            Ok(_) => {}
            Err(e) => {
                result.add_error(ValidationError::new(
                    format!("{path}.options.interval"),
                    e.to_string(),
                ));
            }
        }

        if let Err(e) = parse_duration(&chain.resolve("timeout")) {
            result.add_error(ValidationError::new(
                format!("{path}.options.timeout"),
                e.to_string(),
            ));
        }
    }

    fn validate_latest_version(
        lookup: &LatestVersionConfig,
        path: &str,
        result: &mut ValidationResult,
    ) {
        let path = format!("{path}.latest_version");

        match lookup.kind.as_str() {
            "github" => {
                if lookup.github_repo().is_none() {
                    result.add_error(ValidationError::new(
                        format!("{path}.url"),
                        format!(
                            "'{}' is not 'owner/repo' or a https://github.com/owner/repo URL",
                            lookup.url
                        ),
                    ));
                }
            }
            "url" => {
                if url::Url::parse(&lookup.url).is_err() {
                    result.add_error(ValidationError::new(
                        format!("{path}.url"),
                        format!("Invalid URL '{}'", lookup.url),
                    ));
                }
            }
            other => {
                result.add_error(ValidationError::new(
                    format!("{path}.type"),
                    format!("Unknown lookup type '{other}', valid values: [\"github\", \"url\"]"),
                ));
            }
        }

        for (i, command) in lookup.url_commands.iter().enumerate() {
            let command_path = format!("{path}.url_commands[{i}]");
            match command {
                UrlCommandConfig::Regex { regex, .. }
                | UrlCommandConfig::Replace { regex, .. }
                | UrlCommandConfig::Require { regex, .. } => {
                    check_regex(regex, &format!("{command_path}.regex"), result);
                }
                UrlCommandConfig::Split { text, .. } => {
                    if text.is_empty() {
                        result.add_error(ValidationError::new(
                            format!("{command_path}.text"),
                            "split text cannot be empty",
                        ));
                    }
                }
            }
        }

        if let Some(ref require) = lookup.require {
            if let Some(ref regex) = require.regex_content {
                check_regex(regex, &format!("{path}.require.regex_content"), result);
            }
            if let Some(ref regex) = require.regex_version {
                check_regex(regex, &format!("{path}.require.regex_version"), result);
            }
        }
    }

    fn validate_deployed_version(
        deployed: &DeployedVersionConfig,
        path: &str,
        result: &mut ValidationResult,
    ) {
        let path = format!("{path}.deployed_version");

        if url::Url::parse(&deployed.url).is_err() {
            result.add_error(ValidationError::new(
                format!("{path}.url"),
                format!("Invalid URL '{}'", deployed.url),
            ));
        }

        if let Some(ref regex) = deployed.regex {
            check_regex(regex, &format!("{path}.regex"), result);
        }

        if deployed.json.is_none() && deployed.regex.is_none() {
            result.add_warning(ValidationWarning::new(
                path,
                "Neither json nor regex set, the whole response body is the version",
            ));
        }
    }

    fn validate_notifiers(
        config: &Config,
        hard: &Defaults,
        service: &ServiceConfig,
        path: &str,
        result: &mut ValidationResult,
    ) {
        for (id, notify) in &service.notify {
            let notify_path = format!("{path}.notify.{id}");
            let main = config.notify.get(id);
            let kind = effective_type(
                &notify.kind,
                main.map(|m| m.kind.as_str()).unwrap_or(""),
                id,
            );

            if !KNOWN_NOTIFY_TYPES.contains(&kind.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{notify_path}.type"),
                    format!("Unknown notifier type '{kind}'"),
                ));
            }

            let chain = OverrideChain::new(&notify.options)
                .with_main(main.map(|m| &m.options))
                .with_defaults(config.defaults.notify.get(&kind).map(|d| &d.options))
                .with_hard_defaults(hard.notify.get(&kind).map(|h| &h.options));

            check_delay(&chain.resolve("delay"), &notify_path, result);
            check_max_tries(&chain.resolve("max_tries"), &notify_path, result);
        }
    }

    fn validate_webhooks(
        config: &Config,
        hard: &Defaults,
        service: &ServiceConfig,
        path: &str,
        result: &mut ValidationResult,
    ) {
        for (id, webhook) in &service.webhook {
            let webhook_path = format!("{path}.webhook.{id}");
            let main = config.webhook.get(id);
            let kind = first_non_empty(&[
                &webhook.kind,
                main.map(|m| m.kind.as_str()).unwrap_or(""),
                &config.defaults.webhook.kind,
                &hard.webhook.kind,
            ]);

            if kind != "github" {
                result.add_error(ValidationError::new(
                    format!("{webhook_path}.type"),
                    format!("Unknown webhook type '{kind}', valid values: [\"github\"]"),
                ));
            }

            let chain = OverrideChain::new(&webhook.options)
                .with_main(main.map(|m| &m.options))
                .with_defaults(Some(&config.defaults.webhook.options))
                .with_hard_defaults(Some(&hard.webhook.options));

            let url = chain.resolve("url");
            if url::Url::parse(&url).is_err() {
                result.add_error(ValidationError::new(
                    format!("{webhook_path}.options.url"),
                    format!("Invalid URL '{url}'"),
                ));
            }

            check_delay(&chain.resolve("delay"), &webhook_path, result);
            check_max_tries(&chain.resolve("max_tries"), &webhook_path, result);

            let code = chain.resolve("desired_status_code");
            if !code.is_empty() && code.parse::<u16>().is_err() {
                result.add_error(ValidationError::new(
                    format!("{webhook_path}.options.desired_status_code"),
                    format!("'{code}' is not a HTTP status code"),
                ));
            }
        }
    }
}

fn check_regex(regex: &str, path: &str, result: &mut ValidationResult) {
    if let Err(e) = Regex::new(regex) {
        result.add_error(ValidationError::new(path, format!("Invalid regex: {e}")));
    }
}

fn check_delay(value: &str, path: &str, result: &mut ValidationResult) {
    if !value.is_empty() {
        if let Err(e) = parse_duration(value) {
            result.add_error(ValidationError::new(format!("{path}.options.delay"), e.to_string()));
        }
    }
}

fn check_max_tries(value: &str, path: &str, result: &mut ValidationResult) {
    if !value.is_empty() && value.parse::<u32>().is_err() {
        result.add_error(ValidationError::new(
            format!("{path}.options.max_tries"),
            format!("'{value}' is not a non-negative integer"),
        ));
    }
}
