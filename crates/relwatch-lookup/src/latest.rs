//! Latest version lookup.

use std::cmp::Ordering;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::debug;

use relwatch_config::{LatestVersionConfig, OverrideChain};

use crate::error::LookupError;
use crate::filter::{compile, FilterPipeline};
use crate::github::GitHubSource;
use crate::http;
use crate::version::Version;

#[cfg(test)]
#[path = "latest_tests.rs"]
mod tests;

/// Where the raw text comes from.
pub enum LatestSource {
    /// Release tags of a GitHub repository.
    GitHub(GitHubSource),
    /// Body of a plain URL.
    Url { client: Client, url: String },
}

/// Finds the newest version of a service.
pub struct LatestVersionLookup {
    source: LatestSource,
    pipeline: FilterPipeline,
    version_regex: Option<Regex>,
    use_prerelease: bool,
    semantic_versioning: bool,
}

impl LatestVersionLookup {
    pub fn new(source: LatestSource, pipeline: FilterPipeline) -> Self {
        Self {
            source,
            pipeline,
            version_regex: None,
            use_prerelease: false,
            semantic_versioning: false,
        }
    }

    /// Build from config. `settings` resolves `access_token`,
    /// `allow_invalid_certs` and `use_prerelease`.
    pub fn from_config(
        config: &LatestVersionConfig,
        settings: OverrideChain<'_>,
        github_api_base: &str,
        semantic_versioning: bool,
    ) -> Result<Self, LookupError> {
        let client = http::build_client(settings.bool("allow_invalid_certs").unwrap_or(false))?;

        let source = match config.kind.as_str() {
            "github" => {
                let (owner, repo) = config.github_repo().ok_or_else(|| {
                    LookupError::InvalidConfig(format!("'{}' is not 'owner/repo'", config.url))
                })?;
                LatestSource::GitHub(
                    GitHubSource::new(client, github_api_base, owner, repo)
                        .with_access_token(settings.resolve("access_token")),
                )
            }
            "url" => LatestSource::Url {
                client,
                url: config.url.clone(),
            },
            other => {
                return Err(LookupError::InvalidConfig(format!(
                    "Unknown lookup type '{other}'"
                )));
            }
        };

        let version_regex = config
            .require
            .as_ref()
            .and_then(|r| r.regex_version.as_deref())
            .map(compile)
            .transpose()?;

        Ok(Self {
            source,
            pipeline: FilterPipeline::from_config(config)?,
            version_regex,
            use_prerelease: settings.bool("use_prerelease").unwrap_or(false),
            semantic_versioning,
        })
    }

    pub fn with_prereleases(mut self, use_prerelease: bool) -> Self {
        self.use_prerelease = use_prerelease;
        self
    }

    pub fn with_semantic_versioning(mut self, semantic_versioning: bool) -> Self {
        self.semantic_versioning = semantic_versioning;
        self
    }

    pub fn source(&self) -> &LatestSource {
        &self.source
    }

    /// Query the source for the newest version.
    ///
    /// With semantic versioning a candidate older than `current` is an
    /// [`LookupError::OlderVersion`], and one equal to it (`v1.2.3` against
    /// `1.2.3`) is returned as `current`.
    pub async fn query(&self, current: &str, timeout: Duration) -> Result<String, LookupError> {
        let candidate = match &self.source {
            LatestSource::Url { client, url } => {
                let response = http::send(client.get(url), timeout).await?;
                let body = http::text(response).await?;
                self.accept(&body)?.0
            }
            LatestSource::GitHub(github) => self.newest_release(github, timeout).await?,
        };

        if self.semantic_versioning && !current.is_empty() {
            if let (Ok(new), Ok(old)) = (candidate.parse::<Version>(), current.parse::<Version>()) {
                match new.cmp(&old) {
                    Ordering::Less => {
                        return Err(LookupError::OlderVersion {
                            candidate,
                            current: current.to_string(),
                        });
                    }
                    Ordering::Equal => return Ok(current.to_string()),
                    Ordering::Greater => {}
                }
            }
        }

        Ok(candidate)
    }

    async fn newest_release(&self, github: &GitHubSource, timeout: Duration) -> Result<String, LookupError> {
        let (releases, fresh) = github.get_releases(timeout).await?;
        debug!(url = github.url(), fresh, count = releases.len(), "Checking releases");

        let mut last_error = None;
        let mut candidates = Vec::new();
        for release in releases
            .iter()
            .filter(|r| !r.draft && (self.use_prerelease || !r.prerelease))
        {
            match self.accept(&release.tag_name) {
                Ok((text, Some(version))) => candidates.push((text, version)),
                Ok((text, None)) => return Ok(text),
                Err(e) => {
                    debug!(tag = %release.tag_name, error = %e, "Release skipped");
                    last_error = Some(e);
                }
            }
        }

        candidates
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1))
            .map(|(text, _)| text)
            .ok_or_else(|| last_error.unwrap_or(LookupError::NoReleases))
    }

    /// Run the pipeline and version checks on `raw`.
    fn accept(&self, raw: &str) -> Result<(String, Option<Version>), LookupError> {
        let candidate = self.pipeline.run(raw)?;

        if let Some(ref regex) = self.version_regex {
            if !regex.is_match(&candidate) {
                return Err(LookupError::VersionRejected {
                    version: candidate,
                    reason: format!("does not match {:?}", regex.as_str()),
                });
            }
        }

        if !self.semantic_versioning {
            return Ok((candidate, None));
        }
        match candidate.parse::<Version>() {
            Ok(version) => Ok((candidate, Some(version))),
            Err(e) => Err(LookupError::VersionRejected {
                version: candidate,
                reason: e.to_string(),
            }),
        }
    }
}
