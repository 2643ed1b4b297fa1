//! Delivery of notify triggers to the senders of a service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Instrument};

use relwatch_config::{Config, Defaults};
use relwatch_status::{NotifyTrigger, ServiceInfo};

use crate::failed::FailedTracker;
use crate::notifier::Notifier;
use crate::sender::Sender;
use crate::transport::NotifyTransport;
use crate::webhook::WebHook;

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

/// Outcome of one trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// Sends every trigger to the notifiers and webhooks of its service.
pub struct NotificationDispatch {
    senders: HashMap<String, Vec<Arc<dyn Sender>>>,
    failed: Arc<FailedTracker>,
    retry_interval: Duration,
}

impl NotificationDispatch {
    pub fn new(retry_interval: Duration) -> Self {
        Self {
            senders: HashMap::new(),
            failed: Arc::new(FailedTracker::new()),
            retry_interval,
        }
    }

    /// Register the notifiers and webhooks of every configured service.
    pub fn from_config(config: &Config, hard: &Defaults, transport: Arc<dyn NotifyTransport>) -> Self {
        let mut dispatch = Self::new(config.settings.retry_interval());
        for (service_id, service) in &config.service {
            for (id, notify) in &service.notify {
                let notifier = Notifier::from_config(service_id, id, notify, config, hard, transport.clone());
                dispatch.register(service_id, Arc::new(notifier));
            }
            for (id, webhook) in &service.webhook {
                dispatch.register(service_id, Arc::new(WebHook::from_config(service_id, id, webhook, config, hard)));
            }
        }
        info!(
            services = dispatch.senders.len(),
            senders = dispatch.senders.values().map(Vec::len).sum::<usize>(),
            "Notification dispatch ready"
        );
        dispatch
    }

    pub fn register(&mut self, service_id: impl Into<String>, sender: Arc<dyn Sender>) {
        self.senders.entry(service_id.into()).or_default().push(sender);
    }

    /// Ids of the senders of `service_id`, in registration order.
    pub fn sender_ids(&self, service_id: &str) -> Vec<&str> {
        self.senders
            .get(service_id)
            .map(|senders| senders.iter().map(|s| s.id()).collect())
            .unwrap_or_default()
    }

    pub fn failed(&self) -> &Arc<FailedTracker> {
        &self.failed
    }

    /// Deliver one trigger to all senders of its service concurrently.
    pub async fn handle(&self, trigger: &NotifyTrigger) -> DispatchReport {
        let info = &trigger.info;
        let Some(senders) = self.senders.get(&info.id) else {
            debug!(service = %info.id, "No senders registered");
            return DispatchReport::default();
        };

        let results = join_all(senders.iter().map(|sender| self.deliver(sender.as_ref(), info))).await;

        let mut report = DispatchReport::default();
        for (sender, delivered) in senders.iter().zip(results) {
            self.failed.set(&info.id, sender.kind(), sender.id(), !delivered);
            if delivered {
                report.succeeded.push(sender.id().to_string());
            } else {
                report.failed.push(sender.id().to_string());
            }
        }
        report
    }

    /// Consume the notify sink until every sender is gone. Triggers are
    /// handled one at a time in arrival order.
    pub async fn run(&self, mut rx: mpsc::Receiver<NotifyTrigger>) {
        info!("Notification dispatch started");
        while let Some(trigger) = rx.recv().await {
            let report = self.handle(&trigger).await;
            if !report.failed.is_empty() {
                warn!(
                    service = %trigger.info.id,
                    failed = ?report.failed,
                    "Some notifications were not delivered"
                );
            }
        }
        info!("Notification dispatch stopped");
    }

    /// Wait the sender's delay, then try up to `max(1, max_tries)` times.
    async fn deliver(&self, sender: &dyn Sender, info: &ServiceInfo) -> bool {
        let span = sender.span().clone();
        async move {
            let delay = sender.delay();
            if !delay.is_zero() {
                debug!(?delay, "Waiting before send");
                tokio::time::sleep(delay).await;
            }

            let tries = sender.max_tries().max(1);
            for attempt in 1..=tries {
                match sender.send(info).await {
                    Ok(()) => {
                        info!(attempt, version = %info.latest_version, "Sent");
                        return true;
                    }
                    Err(e) => {
                        warn!(attempt, tries, error = %e, "Send failed");
                        if attempt < tries {
                            tokio::time::sleep(self.retry_interval).await;
                        }
                    }
                }
            }

            error!(tries, "Giving up");
            false
        }
        .instrument(span)
        .await
    }
}
