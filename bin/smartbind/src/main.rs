//! ---
//! smartbin_section: "01-core-functionality"
//! smartbin_subsection: "binary"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Binary entrypoint for the Smart Bin daemon."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use smartbin_common::{init_tracing, AppConfig, LogTarget};
use smartbin_core::{Geocoder, RefreshPipeline, TelemetrySource};
use smartbin_net::{pipeline_from_config, FleetApiBuilder, FleetApiHandle, LatestFleet};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Smart Bin daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "ADDR", help = "Override the REST API listen address")]
    listen: Option<SocketAddr>,

    #[arg(long, help = "Run the refresh loop without serving the REST API")]
    no_api: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/smartbin.toml"));
    candidates.push(PathBuf::from("smartbin.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(listen) = cli.listen {
        config.api.listen = listen;
    }
    if cli.no_api {
        config.api.enabled = false;
    }
    init_tracing("smartbind", &config.logging, LogTarget::StdoutAndFile)?;
    info!(config_path = %loaded.source.display(), "configuration loaded");

    run_daemon(config).await
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let pipeline = pipeline_from_config(&config)?;
    let latest = LatestFleet::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = spawn_refresh_loop(
        pipeline,
        config.dashboard.refresh_interval,
        latest.clone(),
        shutdown_rx,
    );

    let mut api_server: Option<FleetApiHandle> = None;
    if config.api.enabled {
        let builder = FleetApiBuilder::new(config.api.listen, Arc::new(latest.clone()))
            .with_title(config.dashboard.title.clone());
        match builder.spawn().await {
            Ok(server) => api_server = Some(server),
            Err(err) => warn!(error = %err, "failed to start fleet api"),
        }
    } else {
        info!("fleet api disabled by configuration");
    }

    info!("daemon running; waiting for termination signal");
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");

    let _ = shutdown_tx.send(true);
    if let Err(err) = refresher.await {
        warn!(error = %err, "refresh loop ended abnormally");
    }
    if let Some(server) = api_server {
        server.shutdown().await?;
    }
    Ok(())
}

/// Drive the pipeline every `interval` and publish each outcome until
/// `shutdown` flips. The first cycle runs immediately.
fn spawn_refresh_loop<S, G>(
    mut pipeline: RefreshPipeline<S, G>,
    interval: Duration,
    latest: LatestFleet,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: TelemetrySource + 'static,
    G: Geocoder + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tick += 1;
                    match pipeline.refresh(tick).await {
                        Ok(table) => {
                            info!(tick, urgent = table.urgent().count(), "fleet table published");
                            latest.publish_table(table);
                        }
                        Err(err) => {
                            warn!(tick, error = %err, "refresh cycle failed");
                            latest.publish_error(tick, &err);
                        }
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        info!(ticks = tick, "refresh loop stopped");
    })
}
