//! Deployed version lookup.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use relwatch_config::{BasicAuth, DeployedVersionConfig, OverrideChain};

use crate::error::{FilterError, LookupError};
use crate::filter::compile;
use crate::http;

/// Reads the version a service currently runs, usually from its own API.
pub struct DeployedVersionLookup {
    client: Client,
    url: String,
    json: Option<String>,
    regex: Option<Regex>,
    headers: Vec<(String, String)>,
    basic_auth: Option<BasicAuth>,
}

impl DeployedVersionLookup {
    /// Build from config. `settings` resolves `allow_invalid_certs`.
    pub fn from_config(config: &DeployedVersionConfig, settings: OverrideChain<'_>) -> Result<Self, LookupError> {
        Ok(Self {
            client: http::build_client(settings.bool("allow_invalid_certs").unwrap_or(false))?,
            url: config.url.clone(),
            json: config.json.clone().filter(|p| !p.is_empty()),
            regex: config.regex.as_deref().map(compile).transpose()?,
            headers: config
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            basic_auth: config.basic_auth.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn query(&self, timeout: Duration) -> Result<String, LookupError> {
        let mut request = self.client.get(&self.url);
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(ref auth) = self.basic_auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = http::send(request, timeout).await?;
        let body = http::text(response).await?;
        self.extract(&body)
    }

    fn extract(&self, body: &str) -> Result<String, LookupError> {
        let mut text = match self.json {
            Some(ref path) => {
                let value: Value = serde_json::from_str(body)
                    .map_err(|e| LookupError::Fetch(format!("Failed to decode JSON: {e}")))?;
                json_path(&value, path)?
            }
            None => body.to_string(),
        };

        if let Some(ref regex) = self.regex {
            let captures = regex.captures(&text).ok_or_else(|| FilterError::NoMatch {
                regex: regex.as_str().to_string(),
            })?;
            let group = if regex.captures_len() > 1 { 1 } else { 0 };
            text = captures
                .get(group)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(FilterError::Empty.into());
        }
        Ok(text.to_string())
    }
}

/// Follow a dot path such as `data.version` or `items.0.tag`. Numeric
/// segments index arrays.
pub fn json_path(value: &Value, path: &str) -> Result<String, LookupError> {
    let error = |message: String| LookupError::JsonPath {
        path: path.to_string(),
        message,
    };

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map
                .get(segment)
                .ok_or_else(|| error(format!("no key {segment:?}")))?,
            Value::Array(items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| error(format!("{segment:?} is not an array index")))?;
                items
                    .get(index)
                    .ok_or_else(|| error(format!("index {index} out of range for {} item(s)", items.len())))?
            }
            _ => return Err(error(format!("cannot descend into {segment:?}"))),
        };
    }

    match current {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(error("not a string, number or boolean".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relwatch_config::StringMap;
    use std::collections::BTreeMap;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn lookup(config: DeployedVersionConfig) -> DeployedVersionLookup {
        let own = StringMap::new();
        DeployedVersionLookup::from_config(&config, OverrideChain::new(&own)).unwrap()
    }

    #[test]
    fn test_json_path() {
        let value = serde_json::json!({
            "data": { "version": "1.2.3", "build": 42, "stable": true },
            "items": [ { "tag": "v1" }, { "tag": "v2" } ]
        });
        assert_eq!(json_path(&value, "data.version").unwrap(), "1.2.3");
        assert_eq!(json_path(&value, "data.build").unwrap(), "42");
        assert_eq!(json_path(&value, "data.stable").unwrap(), "true");
        assert_eq!(json_path(&value, "items.1.tag").unwrap(), "v2");
    }

    #[test]
    fn test_json_path_errors() {
        let value = serde_json::json!({ "data": { "version": "1.2.3" }, "items": [] });
        for path in ["data.missing", "items.0", "items.x", "data", "data.version.more"] {
            assert!(
                matches!(json_path(&value, path), Err(LookupError::JsonPath { .. })),
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn test_query_json_and_regex() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .and(header("X-Api-Key", "key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": { "version": "v1.4.2-abc" } })),
            )
            .mount(&server)
            .await;

        let lookup = lookup(DeployedVersionConfig {
            url: format!("{}/api/version", server.uri()),
            json: Some("data.version".to_string()),
            regex: Some("v([0-9.]+)".to_string()),
            headers: BTreeMap::from([("X-Api-Key".to_string(), "key".to_string())]),
            ..Default::default()
        });

        assert_eq!(lookup.query(TIMEOUT).await.unwrap(), "1.4.2");
    }

    #[tokio::test]
    async fn test_query_basic_auth() {
        let server = MockServer::start().await;
        // admin:pw
        Mock::given(method("GET"))
            .and(header("Authorization", "Basic YWRtaW46cHc="))
            .respond_with(ResponseTemplate::new(200).set_body_string("2.0.0\n"))
            .mount(&server)
            .await;

        let lookup = lookup(DeployedVersionConfig {
            url: server.uri(),
            basic_auth: Some(BasicAuth {
                username: "admin".to_string(),
                password: "pw".to_string(),
            }),
            ..Default::default()
        });

        assert_eq!(lookup.query(TIMEOUT).await.unwrap(), "2.0.0");
    }

    #[tokio::test]
    async fn test_query_regex_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("unknown"))
            .mount(&server)
            .await;

        let lookup = lookup(DeployedVersionConfig {
            url: server.uri(),
            regex: Some("[0-9]+".to_string()),
            ..Default::default()
        });

        assert!(matches!(
            lookup.query(TIMEOUT).await,
            Err(LookupError::Filter(FilterError::NoMatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_query_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let lookup = lookup(DeployedVersionConfig {
            url: server.uri(),
            json: Some("version".to_string()),
            ..Default::default()
        });

        assert!(matches!(lookup.query(TIMEOUT).await, Err(LookupError::Fetch(_))));
    }
}
