//! Notifiers backed by a [`NotifyTransport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info_span, Span};

use relwatch_config::{effective_type, Config, Defaults, NotifyConfig, OverrideChain, StringMap};
use relwatch_status::ServiceInfo;

use crate::error::SendError;
use crate::sender::{Sender, SenderKind};
use crate::template::render;
use crate::transport::{NotifyMessage, NotifyTransport};

/// A notifier of one service.
///
/// `options`, `params` and `url_fields` each resolve over four layers: the
/// notifier's own config, the top-level notifier with the same id, the
/// user defaults for its type and the hard defaults for its type.
pub struct Notifier {
    service_id: String,
    id: String,
    own: NotifyConfig,
    main: Option<Arc<NotifyConfig>>,
    defaults: Option<Arc<NotifyConfig>>,
    hard_defaults: Option<Arc<NotifyConfig>>,
    transport: Arc<dyn NotifyTransport>,
    span: Span,
}

impl Notifier {
    pub fn new(
        service_id: impl Into<String>,
        id: impl Into<String>,
        own: NotifyConfig,
        transport: Arc<dyn NotifyTransport>,
    ) -> Self {
        let service_id = service_id.into();
        let id = id.into();
        let span = info_span!("notify", service = %service_id, id = %id);
        Self {
            service_id,
            id,
            own,
            main: None,
            defaults: None,
            hard_defaults: None,
            transport,
            span,
        }
    }

    /// Build from config, picking defaults by the resolved type.
    pub fn from_config(
        service_id: &str,
        id: &str,
        own: &NotifyConfig,
        config: &Config,
        hard: &Defaults,
        transport: Arc<dyn NotifyTransport>,
    ) -> Self {
        let main = config.notify.get(id);
        let kind = effective_type(&own.kind, main.map(|m| m.kind.as_str()).unwrap_or(""), id);
        Self::new(service_id, id, own.clone(), transport)
            .with_main(main.cloned())
            .with_defaults(config.defaults.notify.get(&kind).cloned())
            .with_hard_defaults(hard.notify.get(&kind).cloned())
    }

    pub fn with_main(mut self, main: Option<NotifyConfig>) -> Self {
        self.main = main.map(Arc::new);
        self
    }

    pub fn with_defaults(mut self, defaults: Option<NotifyConfig>) -> Self {
        self.defaults = defaults.map(Arc::new);
        self
    }

    pub fn with_hard_defaults(mut self, hard_defaults: Option<NotifyConfig>) -> Self {
        self.hard_defaults = hard_defaults.map(Arc::new);
        self
    }

    /// Backend type: own, else main's, else the id.
    pub fn notify_type(&self) -> String {
        let main = self.main.as_deref().map(|m| m.kind.as_str()).unwrap_or("");
        effective_type(&self.own.kind, main, &self.id)
    }

    /// Set an option on this notifier only.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.own.options.insert(key.into(), value.into());
    }

    /// Set a param on this notifier only.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.own.params.insert(key.into(), value.into());
    }

    /// Set a URL field on this notifier only.
    pub fn set_url_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.own.url_fields.insert(key.into(), value.into());
    }

    pub fn option(&self, key: &str) -> String {
        self.chain(|c| &c.options).resolve(key)
    }

    pub fn param(&self, key: &str) -> String {
        self.chain(|c| &c.params).resolve(key)
    }

    pub fn url_field(&self, key: &str) -> String {
        self.chain(|c| &c.url_fields).resolve(key)
    }

    /// The templated message for `info`.
    pub fn message(&self, info: &ServiceInfo) -> String {
        render(&self.option("message"), info)
    }

    /// The templated title for `info`.
    pub fn title(&self, info: &ServiceInfo) -> String {
        render(&self.param("title"), info)
    }

    /// Everything the transport needs, resolved and templated.
    pub fn build_message(&self, info: &ServiceInfo) -> NotifyMessage {
        let params: StringMap = self
            .chain(|c| &c.params)
            .resolve_all()
            .into_iter()
            .map(|(key, value)| {
                let value = render(&value, info);
                (key, value)
            })
            .collect();

        NotifyMessage {
            service_id: self.service_id.clone(),
            sender_id: self.id.clone(),
            kind: self.notify_type(),
            title: self.title(info),
            message: self.message(info),
            url_fields: self.chain(|c| &c.url_fields).resolve_all(),
            params,
        }
    }

    fn chain(&self, pick: fn(&NotifyConfig) -> &StringMap) -> OverrideChain<'_> {
        OverrideChain::new(pick(&self.own))
            .with_main(self.main.as_deref().map(pick))
            .with_defaults(self.defaults.as_deref().map(pick))
            .with_hard_defaults(self.hard_defaults.as_deref().map(pick))
    }
}

#[async_trait]
impl Sender for Notifier {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SenderKind {
        SenderKind::Notify
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
        let message = self.build_message(info);
        self.transport.send(&message).await
    }
}
