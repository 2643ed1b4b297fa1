//! GitHub-style webhooks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;
use tokio::sync::OnceCell;
use tracing::{debug, info_span, Span};
use uuid::Uuid;

use relwatch_config::{first_non_empty, Config, Defaults, OverrideChain, StringMap, WebHookConfig};
use relwatch_status::ServiceInfo;

use crate::error::SendError;
use crate::sender::{Sender, SenderKind};
use crate::template::render;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type HmacSha256 = Hmac<Sha256>;

/// Body of a GitHub push event, the only payload flavour.
#[derive(Debug, Serialize)]
struct GitHubPayload {
    #[serde(rename = "ref")]
    reference: &'static str,
    before: String,
    after: String,
}

impl GitHubPayload {
    fn new() -> Self {
        Self {
            reference: "refs/heads/master",
            before: random_sha(),
            after: random_sha(),
        }
    }
}

/// 40 random hex characters, the shape of a commit SHA.
fn random_sha() -> String {
    let tail = Uuid::new_v4().simple().to_string();
    format!("{}{}", Uuid::new_v4().simple(), &tail[..8])
}

/// `X-Hub-Signature-256` value of `body` signed with `secret`.
fn signature(secret: &str, body: &[u8]) -> Result<String, SendError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| SendError::Request(e.to_string()))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// A webhook of one service.
pub struct WebHook {
    service_id: String,
    id: String,
    own: WebHookConfig,
    main: Option<Arc<WebHookConfig>>,
    defaults: Option<Arc<WebHookConfig>>,
    hard_defaults: Option<Arc<WebHookConfig>>,
    client: OnceCell<Client>,
    span: Span,
}

impl WebHook {
    pub fn new(service_id: impl Into<String>, id: impl Into<String>, own: WebHookConfig) -> Self {
        let service_id = service_id.into();
        let id = id.into();
        let span = info_span!("webhook", service = %service_id, id = %id);
        Self {
            service_id,
            id,
            own,
            main: None,
            defaults: None,
            hard_defaults: None,
            client: OnceCell::new(),
            span,
        }
    }

    pub fn from_config(service_id: &str, id: &str, own: &WebHookConfig, config: &Config, hard: &Defaults) -> Self {
        Self::new(service_id, id, own.clone())
            .with_main(config.webhook.get(id).cloned())
            .with_defaults(Some(config.defaults.webhook.clone()))
            .with_hard_defaults(Some(hard.webhook.clone()))
    }

    pub fn with_main(mut self, main: Option<WebHookConfig>) -> Self {
        self.main = main.map(Arc::new);
        self
    }

    pub fn with_defaults(mut self, defaults: Option<WebHookConfig>) -> Self {
        self.defaults = defaults.map(Arc::new);
        self
    }

    pub fn with_hard_defaults(mut self, hard_defaults: Option<WebHookConfig>) -> Self {
        self.hard_defaults = hard_defaults.map(Arc::new);
        self
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Payload flavour over all four layers.
    pub fn webhook_type(&self) -> &str {
        first_non_empty(&[
            &self.own.kind,
            kind_of(&self.main),
            kind_of(&self.defaults),
            kind_of(&self.hard_defaults),
        ])
    }

    /// Set an option on this webhook only.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == "allow_invalid_certs" {
            self.client = OnceCell::new();
        }
        self.own.options.insert(key, value.into());
    }

    /// Set a custom header on this webhook only.
    pub fn set_custom_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.own.custom_headers.insert(key.into(), value.into());
    }

    pub fn option(&self, key: &str) -> String {
        self.chain(|c| &c.options).resolve(key)
    }

    /// Status the receiver must answer with. `0` accepts any 2xx.
    pub fn desired_status_code(&self) -> u16 {
        self.option("desired_status_code").parse().unwrap_or(0)
    }

    /// Custom headers resolved per key and templated for `info`.
    pub fn custom_headers(&self, info: &ServiceInfo) -> StringMap {
        self.chain(|c| &c.custom_headers)
            .resolve_all()
            .into_iter()
            .map(|(key, value)| {
                let value = render(&value, info);
                (key, value)
            })
            .collect()
    }

    /// Request headers. With a `secret`, `body` is signed the way GitHub
    /// signs push events.
    fn headers(&self, info: &ServiceInfo, body: &[u8]) -> Result<HeaderMap, SendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static("x-github-event"), HeaderValue::from_static("push"));
        let secret = self.option("secret");
        if !secret.is_empty() {
            let value = HeaderValue::from_str(&signature(&secret, body)?)
                .map_err(|_| SendError::InvalidHeader("X-Hub-Signature-256".to_string()))?;
            headers.insert(HeaderName::from_static("x-hub-signature-256"), value);
        }
        for (key, value) in self.custom_headers(info) {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| SendError::InvalidHeader(key.clone()))?;
            let value = HeaderValue::from_str(&value).map_err(|_| SendError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn client(&self) -> Result<&Client, SendError> {
        self.client
            .get_or_try_init(|| async {
                let allow_invalid_certs = self.chain(|c| &c.options).bool("allow_invalid_certs").unwrap_or(false);
                Client::builder()
                    .danger_accept_invalid_certs(allow_invalid_certs)
                    .build()
                    .map_err(|e| SendError::Request(e.to_string()))
            })
            .await
    }

    fn chain(&self, pick: fn(&WebHookConfig) -> &StringMap) -> OverrideChain<'_> {
        OverrideChain::new(pick(&self.own))
            .with_main(self.main.as_deref().map(pick))
            .with_defaults(self.defaults.as_deref().map(pick))
            .with_hard_defaults(self.hard_defaults.as_deref().map(pick))
    }
}

fn kind_of(layer: &Option<Arc<WebHookConfig>>) -> &str {
    layer.as_deref().map(|c| c.kind.as_str()).unwrap_or("")
}

#[async_trait]
impl Sender for WebHook {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SenderKind {
        SenderKind::WebHook
    }

    fn delay(&self) -> Duration {
        self.chain(|c| &c.options).delay()
    }

    fn max_tries(&self) -> u32 {
        self.chain(|c| &c.options).max_tries()
    }

    fn span(&self) -> &Span {
        &self.span
    }

    async fn send(&self, info: &ServiceInfo) -> Result<(), SendError> {
        let url = render(&self.option("url"), info);
        if url.is_empty() {
            return Err(SendError::Request("no url".to_string()));
        }
        let timeout = self.chain(|c| &c.options).duration("timeout").unwrap_or(DEFAULT_TIMEOUT);
        let body = serde_json::to_vec(&GitHubPayload::new()).map_err(|e| SendError::Request(e.to_string()))?;

        let response = self
            .client()
            .await?
            .post(&url)
            .headers(self.headers(info, &body)?)
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SendError::Request(e.to_string()))?;

        let status = response.status();
        let desired = self.desired_status_code();
        let accepted = if desired == 0 {
            status.is_success()
        } else {
            status.as_u16() == desired
        };
        if !accepted {
            return Err(SendError::UnexpectedStatus {
                status: status.as_u16(),
                expected: (desired != 0).then_some(desired),
            });
        }

        debug!(%url, status = status.as_u16(), "Webhook delivered");
        Ok(())
    }
}
