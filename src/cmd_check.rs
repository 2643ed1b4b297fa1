//! `relwatch check` and `relwatch validate`.

use anyhow::bail;

use relwatch_config::{hard_defaults, Config, ConfigValidator};
use relwatch_service::build_services;
use relwatch_status::Sinks;

/// Query the versions of every service (or just `only`) and print them.
pub(crate) async fn check(config: &Config, only: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = only {
        if !config.service.contains_key(id) {
            bail!("Unknown service '{id}'");
        }
    }

    // Nothing reads the sinks: the queries below never dispatch.
    let (sinks, _receivers) = Sinks::new(1);
    let services = build_services(config, &hard_defaults(), &sinks)?;

    println!("{:<24} {:<20} {}", "SERVICE", "LATEST", "DEPLOYED");
    println!("{}", "-".repeat(64));
    for service in services.iter().filter(|s| only.is_none_or(|id| s.id() == id)) {
        let latest = match service.query_latest().await {
            Ok(version) => version,
            Err(e) => format!("error: {e}"),
        };
        let deployed = match service.query_deployed().await {
            Some(Ok(version)) => version,
            Some(Err(e)) => format!("error: {e}"),
            None => "-".to_string(),
        };
        println!("{:<24} {:<20} {}", service.id(), latest, deployed);
    }

    Ok(())
}

/// Print validation errors and warnings. Fails when there are errors.
pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        bail!("{} configuration error(s)", result.errors.len());
    }
    println!("Configuration is valid ({} service(s))", config.service.len());
    Ok(())
}
