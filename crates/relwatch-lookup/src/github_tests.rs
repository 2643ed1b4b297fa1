use super::*;
use crate::http::build_client;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);
const RELEASES_PATH: &str = "/repos/release-argus/Argus/releases";

fn releases_body() -> serde_json::Value {
    serde_json::json!([
        { "tag_name": "v2.0.0", "prerelease": false, "draft": false },
        { "tag_name": "v1.9.0", "prerelease": false, "draft": false },
    ])
}

fn source(server: &MockServer) -> GitHubSource {
    GitHubSource::new(build_client(false).unwrap(), &server.uri(), "release-argus", "Argus")
}

#[test]
fn test_url() {
    let source = GitHubSource::new(
        build_client(false).unwrap(),
        "https://api.github.com/",
        "release-argus",
        "Argus",
    );
    assert_eq!(
        source.url(),
        "https://api.github.com/repos/release-argus/Argus/releases"
    );
}

#[tokio::test]
async fn test_full_response_fills_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc\"")
                .set_body_json(releases_body()),
        )
        .mount(&server)
        .await;

    let source = source(&server);
    let (releases, fresh) = source.get_releases(TIMEOUT).await.unwrap();

    assert!(fresh);
    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].tag_name, "v2.0.0");
    let (etag, cached) = source.cache().snapshot();
    assert_eq!(etag, "\"abc\"");
    assert_eq!(cached, releases);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("if-none-match").is_none());
}

#[tokio::test]
async fn test_not_modified_returns_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(header("If-None-Match", "abc"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&server);
    source.cache().set("abc", vec![Release::new("v1.0.0")]);

    let (releases, fresh) = source.get_releases(TIMEOUT).await.unwrap();

    assert!(!fresh);
    assert_eq!(releases, vec![Release::new("v1.0.0")]);
    assert_eq!(source.cache().token(), "abc");
    assert_eq!(source.cache().releases(), vec![Release::new("v1.0.0")]);
}

#[tokio::test]
async fn test_modified_replaces_token_and_releases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(header("If-None-Match", "old"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "new")
                .set_body_json(releases_body()),
        )
        .mount(&server)
        .await;

    let source = source(&server);
    source.cache().set("old", vec![Release::new("v1.0.0")]);

    let (releases, fresh) = source.get_releases(TIMEOUT).await.unwrap();
    assert!(fresh);
    assert_eq!(releases[0].tag_name, "v2.0.0");
    assert_eq!(source.cache().snapshot(), ("new".to_string(), releases));
}

#[tokio::test]
async fn test_error_status_leaves_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = source(&server);
    source.cache().set("abc", vec![Release::new("v1.0.0")]);

    let result = source.get_releases(TIMEOUT).await;
    assert!(matches!(result, Err(LookupError::Status { status: 500, .. })));
    assert_eq!(source.cache().token(), "abc");
    assert_eq!(source.cache().releases(), vec![Release::new("v1.0.0")]);
}

#[tokio::test]
async fn test_undecodable_body_leaves_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "new")
                .set_body_string("not json"),
        )
        .mount(&server)
        .await;

    let source = source(&server);
    source.cache().set("abc", vec![Release::new("v1.0.0")]);

    let result = source.get_releases(TIMEOUT).await;
    assert!(matches!(result, Err(LookupError::Fetch(_))));
    assert_eq!(source.cache().token(), "abc");
}

#[tokio::test]
async fn test_timeout_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(releases_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let source = source(&server);
    let result = source.get_releases(Duration::from_millis(50)).await;
    assert!(matches!(result, Err(LookupError::Fetch(_))));
    assert_eq!(source.cache().token(), "");
}

#[tokio::test]
async fn test_access_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(header("Authorization", "token ghp_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&server).with_access_token("ghp_secret");
    let (releases, _) = source.get_releases(TIMEOUT).await.unwrap();
    assert_eq!(releases.len(), 2);
}
