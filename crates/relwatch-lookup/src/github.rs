//! GitHub releases with conditional requests.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::cache::ConditionalCache;
use crate::error::LookupError;
use crate::http;
use crate::release::Release;

/// Release list of one repository, refreshed with `If-None-Match`.
pub struct GitHubSource {
    client: Client,
    url: String,
    access_token: Option<String>,
    cache: ConditionalCache,
}

impl GitHubSource {
    /// Source for `owner/repo` below `api_base` (e.g. `https://api.github.com`).
    pub fn new(client: Client, api_base: &str, owner: &str, repo: &str) -> Self {
        Self {
            client,
            url: format!("{}/repos/{owner}/{repo}/releases", api_base.trim_end_matches('/')),
            access_token: None,
            cache: ConditionalCache::new(),
        }
    }

    /// Send `Authorization: token <token>`. Empty tokens are ignored.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache(&self) -> &ConditionalCache {
        &self.cache
    }

    /// Fetch the releases, newest first.
    ///
    /// Returns the cached releases with `fresh = false` on `304 Not Modified`.
    /// A `200` replaces token and releases together and returns
    /// `fresh = true`. On any error the cache is left as it was.
    pub async fn get_releases(&self, timeout: Duration) -> Result<(Vec<Release>, bool), LookupError> {
        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/vnd.github+json");

        let etag = self.cache.token();
        if !etag.is_empty() {
            request = request.header(IF_NONE_MATCH, &etag);
        }
        if let Some(ref token) = self.access_token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = http::send(request, timeout).await?;

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                debug!(url = %self.url, %etag, "Releases not modified");
                Ok((self.cache.releases(), false))
            }
            StatusCode::OK => {
                let new_etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let releases: Vec<Release> = response
                    .json()
                    .await
                    .map_err(|e| LookupError::Fetch(format!("Failed to decode releases: {e}")))?;
                debug!(url = %self.url, etag = %new_etag, count = releases.len(), "Releases fetched");
                self.cache.set(new_etag, releases.clone());
                Ok((releases, true))
            }
            status => Err(LookupError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
