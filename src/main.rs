//! protolab - terminal console for a dental-prosthetics lab.
//!
//! Loads the configuration, starts file logging, builds the simulated lab
//! server and runs the TUI until the user quits.

mod logging;

use anyhow::Context;
use protolab_backend::{BackendSettings, LabBackend, LabSnapshot, SnapshotStore};
use protolab_config::Config;
use protolab_tui::{App, terminal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().await.context("loading configuration")?;
    let _log_guard = logging::init(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting protolab");

    let mut settings = BackendSettings::instant()
        .with_latency(config.backend.latency())
        .with_offline(config.backend.offline);
    for status in config.backend.parsed_fail_statuses()? {
        settings = settings.refusing(status);
    }

    let store = config.backend.snapshot.as_ref().map(SnapshotStore::with_path);
    let snapshot = match &store {
        Some(store) => store.load()?.unwrap_or_else(|| {
            info!(path = %store.path().display(), "no snapshot yet, starting from sample data");
            LabSnapshot::sample()
        }),
        None => LabSnapshot::sample(),
    };

    let backend = LabBackend::from_snapshot(snapshot, settings);
    let mut app = App::new(backend.clone(), &config, backend.snapshot().await);

    terminal::install_panic_hook();
    let mut terminal = terminal::setup_terminal()?;
    let result = app.run(&mut terminal).await;
    terminal::restore_terminal(&mut terminal)?;

    if let Some(store) = &store
        && let Err(e) = store.save(&backend.snapshot().await)
    {
        warn!(error = %e, "failed to save snapshot");
    }

    info!("protolab stopped");
    result
}
