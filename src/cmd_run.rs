//! `relwatch run`: watch every service until interrupted.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use relwatch_config::{hard_defaults, Config, ConfigValidator};
use relwatch_db::StatusDatabase;
use relwatch_notify::{LogTransport, NotificationDispatch};
use relwatch_service::build_services;
use relwatch_status::{SinkReceivers, Sinks};

pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting relwatch v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            error!(path = %error.path, "{}", error.message);
        }
        bail!("{} configuration error(s)", validation.errors.len());
    }

    let hard = hard_defaults();
    let database_path = config.settings.database_path();
    let db = Arc::new(StatusDatabase::open(&database_path).await?);
    info!("Database: {}", database_path.display());

    let (sinks, receivers) = Sinks::new(config.settings.sink_capacity);
    let services = build_services(&config, &hard, &sinks)?;
    drop(sinks);

    let by_id: HashMap<&str, _> = services.iter().map(|s| (s.id(), s)).collect();
    for (id, fields) in db.load_all().await? {
        match by_id.get(id.as_str()) {
            Some(service) => service.status().restore(fields),
            None => {
                db.delete(&id).await?;
                info!(service = %id, "Removed stored status of unconfigured service");
            }
        }
    }

    let SinkReceivers {
        persist,
        announce,
        notify,
    } = receivers;

    let db_task = {
        let db = db.clone();
        tokio::spawn(async move { db.run(persist).await })
    };
    let dispatch = NotificationDispatch::from_config(&config, &hard, Arc::new(LogTransport));
    let notify_task = tokio::spawn(async move { dispatch.run(notify).await });
    let announce_task = tokio::spawn(log_announcements(announce));

    let (shutdown_tx, _) = broadcast::channel(1);
    let service_tasks: Vec<_> = services
        .iter()
        .map(|service| tokio::spawn(service.clone().run(shutdown_tx.subscribe())))
        .collect();
    info!("relwatch ready, watching {} service(s)", services.len());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    let _ = shutdown_tx.send(());
    for task in service_tasks {
        let _ = task.await;
    }

    // The services hold the last sink senders. Dropping them lets the
    // consumers drain and stop.
    drop(services);
    let _ = tokio::join!(db_task, notify_task, announce_task);

    info!("Stopped");
    Ok(())
}

/// Consumer of the announce sink.
async fn log_announcements(mut rx: mpsc::Receiver<Vec<u8>>) {
    while let Some(message) = rx.recv().await {
        debug!(target: "relwatch::announce", "{}", String::from_utf8_lossy(&message));
    }
}
