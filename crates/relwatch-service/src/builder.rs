//! Services from configuration.

use std::sync::Arc;

use tracing::info;

use relwatch_config::{Config, Defaults, LatestVersionConfig, OverrideChain, ServiceConfig};
use relwatch_lookup::{DeployedVersionLookup, LatestVersionLookup};
use relwatch_status::{Sinks, Status};

use crate::error::ServiceError;
use crate::service::{Service, ServiceSchedule};

/// Build every configured service, ordered by id.
pub fn build_services(config: &Config, hard: &Defaults, sinks: &Sinks) -> Result<Vec<Arc<Service>>, ServiceError> {
    let services = config
        .service
        .iter()
        .map(|(id, service)| build_service(id, service, config, hard, sinks).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = services.len(), "Services loaded");
    Ok(services)
}

/// Build one service, resolving its options, lookup settings and URLs.
pub fn build_service(
    id: &str,
    service: &ServiceConfig,
    config: &Config,
    hard: &Defaults,
    sinks: &Sinks,
) -> Result<Service, ServiceError> {
    let own = service.options.as_layer();
    let defaults = config.defaults.service.options.as_layer();
    let hard_options = hard.service.options.as_layer();
    let options = OverrideChain::new(&own)
        .with_defaults(Some(&defaults))
        .with_hard_defaults(Some(&hard_options));

    let interval = options
        .duration("interval")
        .filter(|d| !d.is_zero())
        .ok_or_else(|| ServiceError::build(id, format!("invalid interval '{}'", options.resolve("interval"))))?;
    let timeout = options
        .duration("timeout")
        .ok_or_else(|| ServiceError::build(id, format!("invalid timeout '{}'", options.resolve("timeout"))))?;
    let schedule = ServiceSchedule {
        active: options.bool("active").unwrap_or(true),
        interval,
        timeout,
    };
    let semantic_versioning = options.bool("semantic_versioning").unwrap_or(true);

    let latest_config = &service.latest_version;
    let own = latest_config.settings.as_layer();
    let defaults = config.defaults.service.latest_version.as_layer();
    let hard_settings = hard.service.latest_version.as_layer();
    let latest = LatestVersionLookup::from_config(
        latest_config,
        OverrideChain::new(&own)
            .with_defaults(Some(&defaults))
            .with_hard_defaults(Some(&hard_settings)),
        &config.settings.github_api_base,
        semantic_versioning,
    )
    .map_err(|e| ServiceError::build(id, e.to_string()))?;

    let deployed = match service.deployed_version {
        Some(ref deployed_config) => {
            let own = deployed_config.as_layer();
            let defaults = config.defaults.service.deployed_version.as_layer();
            let hard_settings = hard.service.deployed_version.as_layer();
            let chain = OverrideChain::new(&own)
                .with_defaults(Some(&defaults))
                .with_hard_defaults(Some(&hard_settings));
            Some(
                DeployedVersionLookup::from_config(deployed_config, chain)
                    .map_err(|e| ServiceError::build(id, e.to_string()))?,
            )
        }
        None => None,
    };

    let (service_url, web_url) = urls(latest_config, service.web_url.as_deref());
    let status = Arc::new(Status::new(id, sinks.clone()).with_urls(service_url, web_url));

    let mut built = Service::new(status, latest).with_schedule(schedule);
    if let Some(deployed) = deployed {
        built = built.with_deployed(deployed);
    }
    Ok(built)
}

/// Lookup URL and web URL of a service. GitHub services without a
/// `web_url` link to the release page of the latest version.
fn urls(latest: &LatestVersionConfig, web_url: Option<&str>) -> (String, String) {
    let web_url = web_url.unwrap_or_default();
    match latest.github_repo() {
        Some((owner, repo)) if latest.kind == "github" => {
            let service_url = format!("https://github.com/{owner}/{repo}");
            let web_url = if web_url.is_empty() {
                format!("{service_url}/releases/tag/{{{{ version }}}}")
            } else {
                web_url.to_string()
            };
            (service_url, web_url)
        }
        _ => (latest.url.clone(), web_url.to_string()),
    }
}
