use super::*;
use crate::error::FilterError;
use crate::filter::FilterStep;
use relwatch_config::{RequireConfig, StringMap, UrlCommandConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);
const RELEASES_PATH: &str = "/repos/owner/repo/releases";

async fn github_server(releases: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(&server)
        .await;
    server
}

fn github_lookup(server: &MockServer, steps: Vec<FilterStep>) -> LatestVersionLookup {
    let source = GitHubSource::new(http::build_client(false).unwrap(), &server.uri(), "owner", "repo");
    LatestVersionLookup::new(LatestSource::GitHub(source), FilterPipeline::new(steps))
}

fn strip_v() -> FilterStep {
    FilterStep::regex_extract("^v?(.+)$", None, 0).unwrap()
}

#[tokio::test]
async fn test_github_first_release_without_semver() {
    let server = github_server(serde_json::json!([
        { "tag_name": "v1.2.0" },
        { "tag_name": "v1.10.0" },
    ]))
    .await;

    let lookup = github_lookup(&server, vec![strip_v()]);
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "1.2.0");
}

#[tokio::test]
async fn test_github_semver_picks_greatest() {
    let server = github_server(serde_json::json!([
        { "tag_name": "v1.2.0" },
        { "tag_name": "v1.10.0" },
        { "tag_name": "nightly" },
        { "tag_name": "v1.9.3" },
    ]))
    .await;

    let lookup = github_lookup(&server, vec![strip_v()]).with_semantic_versioning(true);
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "1.10.0");
}

#[tokio::test]
async fn test_github_skips_prereleases_and_drafts() {
    let server = github_server(serde_json::json!([
        { "tag_name": "v3.0.0", "draft": true },
        { "tag_name": "v2.0.0-rc.1", "prerelease": true },
        { "tag_name": "v1.5.0" },
    ]))
    .await;

    let lookup = github_lookup(&server, vec![strip_v()]).with_semantic_versioning(true);
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "1.5.0");

    let lookup = github_lookup(&server, vec![strip_v()])
        .with_semantic_versioning(true)
        .with_prereleases(true);
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "2.0.0-rc.1");
}

#[tokio::test]
async fn test_github_no_releases() {
    let server = github_server(serde_json::json!([])).await;
    let lookup = github_lookup(&server, vec![]);
    assert!(matches!(
        lookup.query("", TIMEOUT).await,
        Err(LookupError::NoReleases)
    ));
}

#[tokio::test]
async fn test_github_all_rejected_reports_reason() {
    let server = github_server(serde_json::json!([{ "tag_name": "nightly" }])).await;
    let lookup = github_lookup(&server, vec![FilterStep::regex_extract("v([0-9.]+)", None, 0).unwrap()]);
    assert!(matches!(
        lookup.query("", TIMEOUT).await,
        Err(LookupError::Filter(FilterError::NoMatch { .. }))
    ));
}

#[tokio::test]
async fn test_older_version_rejected() {
    let server = github_server(serde_json::json!([{ "tag_name": "v1.0.0" }])).await;
    let lookup = github_lookup(&server, vec![strip_v()]).with_semantic_versioning(true);

    let result = lookup.query("1.1.0", TIMEOUT).await;
    assert!(matches!(result, Err(LookupError::OlderVersion { .. })));

    assert_eq!(lookup.query("1.0.0", TIMEOUT).await.unwrap(), "1.0.0");
    assert_eq!(lookup.query("0.9.0", TIMEOUT).await.unwrap(), "1.0.0");
}

#[tokio::test]
async fn test_older_version_allowed_without_semver() {
    let server = github_server(serde_json::json!([{ "tag_name": "v1.0.0" }])).await;
    let lookup = github_lookup(&server, vec![strip_v()]);
    assert_eq!(lookup.query("1.1.0", TIMEOUT).await.unwrap(), "1.0.0");
}

#[tokio::test]
async fn test_url_source_with_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string("release v2.3.1 notes"))
        .mount(&server)
        .await;

    let lookup = LatestVersionLookup::new(
        LatestSource::Url {
            client: http::build_client(false).unwrap(),
            url: format!("{}/changelog", server.uri()),
        },
        FilterPipeline::new(vec![
            FilterStep::regex_extract("v([0-9.]+)", Some(1), 0).unwrap(),
        ]),
    );
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "2.3.1");
}

#[tokio::test]
async fn test_url_source_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let lookup = LatestVersionLookup::new(
        LatestSource::Url {
            client: http::build_client(false).unwrap(),
            url: format!("{}/missing", server.uri()),
        },
        FilterPipeline::default(),
    );
    assert!(matches!(
        lookup.query("", TIMEOUT).await,
        Err(LookupError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_version_regex_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2.0.0-beta"))
        .mount(&server)
        .await;

    let config = LatestVersionConfig {
        kind: "url".to_string(),
        url: server.uri(),
        require: Some(RequireConfig {
            regex_content: None,
            regex_version: Some(r"^[0-9.]+$".to_string()),
        }),
        ..Default::default()
    };
    let own = StringMap::new();
    let lookup =
        LatestVersionLookup::from_config(&config, OverrideChain::new(&own), "https://api.github.com", false).unwrap();

    assert!(matches!(
        lookup.query("", TIMEOUT).await,
        Err(LookupError::VersionRejected { .. })
    ));
}

#[tokio::test]
async fn test_semver_equal_version_keeps_current_spelling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v1.2.3"))
        .mount(&server)
        .await;

    let lookup = LatestVersionLookup::new(
        LatestSource::Url {
            client: http::build_client(false).unwrap(),
            url: server.uri(),
        },
        FilterPipeline::default(),
    );
    assert_eq!(lookup.query("1.2.3", TIMEOUT).await.unwrap(), "v1.2.3");

    let lookup = lookup.with_semantic_versioning(true);
    assert_eq!(lookup.query("1.2.3", TIMEOUT).await.unwrap(), "1.2.3");
    assert_eq!(lookup.query("1.2.2", TIMEOUT).await.unwrap(), "v1.2.3");
}

#[tokio::test]
async fn test_semver_rejects_unparsable_url_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("latest"))
        .mount(&server)
        .await;

    let lookup = LatestVersionLookup::new(
        LatestSource::Url {
            client: http::build_client(false).unwrap(),
            url: server.uri(),
        },
        FilterPipeline::default(),
    )
    .with_semantic_versioning(true);

    assert!(matches!(
        lookup.query("", TIMEOUT).await,
        Err(LookupError::VersionRejected { .. })
    ));
}

#[tokio::test]
async fn test_from_config_github() {
    let server = github_server(serde_json::json!([
        { "tag_name": "v0.9.0-beta", "prerelease": true },
        { "tag_name": "v0.8.0" },
    ]))
    .await;

    let config = LatestVersionConfig {
        kind: "github".to_string(),
        url: "https://github.com/owner/repo".to_string(),
        url_commands: vec![UrlCommandConfig::Regex {
            regex: "^v(.*)$".to_string(),
            group: None,
            index: 0,
        }],
        require: Some(RequireConfig {
            regex_content: None,
            regex_version: Some("^0\\.".to_string()),
        }),
        ..Default::default()
    };
    let own: StringMap = [("use_prerelease".to_string(), "true".to_string())].into();

    let lookup =
        LatestVersionLookup::from_config(&config, OverrideChain::new(&own), &server.uri(), true).unwrap();
    assert_eq!(lookup.query("", TIMEOUT).await.unwrap(), "0.9.0-beta");
}

#[test]
fn test_from_config_unknown_type() {
    let config = LatestVersionConfig {
        kind: "gitlab".to_string(),
        url: "owner/repo".to_string(),
        ..Default::default()
    };
    let own = StringMap::new();
    let result = LatestVersionLookup::from_config(&config, OverrideChain::new(&own), "https://api.github.com", false);
    assert!(matches!(result, Err(LookupError::InvalidConfig(_))));
}
