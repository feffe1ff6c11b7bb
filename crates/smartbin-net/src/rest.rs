//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Read-only REST surface for the latest fleet table."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use smartbin_core::FleetTable;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Outcome of the most recent refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FleetStatus {
    /// No cycle has completed yet.
    Pending,
    /// The last cycle produced a table.
    Ready {
        /// Table produced by the cycle.
        table: FleetTable,
    },
    /// The last cycle failed; the next tick retries.
    Failed {
        /// Tick of the failed cycle.
        tick: u64,
        /// User-facing error text.
        error: String,
    },
}

/// Supplies the fleet status served by the API.
pub trait FleetProvider: Send + Sync + 'static {
    /// Current status; cheap to call on every request.
    fn status(&self) -> FleetStatus;
}

/// Shared slot the refresh loop publishes into.
#[derive(Debug, Clone)]
pub struct LatestFleet {
    inner: Arc<RwLock<FleetStatus>>,
}

impl Default for LatestFleet {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FleetStatus::Pending)),
        }
    }
}

impl LatestFleet {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a successful cycle.
    pub fn publish_table(&self, table: FleetTable) {
        *self.inner.write() = FleetStatus::Ready { table };
    }

    /// Publish a failed cycle, replacing any earlier table.
    pub fn publish_error(&self, tick: u64, error: impl ToString) {
        *self.inner.write() = FleetStatus::Failed {
            tick,
            error: error.to_string(),
        };
    }
}

impl FleetProvider for LatestFleet {
    fn status(&self) -> FleetStatus {
        self.inner.read().clone()
    }
}

/// Builder used to configure and spawn the fleet API server.
#[derive(Clone)]
pub struct FleetApiBuilder {
    listen: SocketAddr,
    provider: Arc<dyn FleetProvider>,
    title: String,
}

impl FleetApiBuilder {
    /// Construct a builder serving `provider` on `listen`.
    pub fn new(listen: SocketAddr, provider: Arc<dyn FleetProvider>) -> Self {
        Self {
            listen,
            provider,
            title: String::new(),
        }
    }

    /// Dashboard title echoed by the health endpoint.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Spawn the server and return a handle used for shutdown.
    pub async fn spawn(self) -> anyhow::Result<FleetApiHandle> {
        let listener = TcpListener::bind(self.listen).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, "fleet api listening");

        let state = Arc::new(ApiState {
            provider: self.provider,
            title: self.title,
        });
        let router = Router::new()
            .route("/api/fleet", get(get_fleet))
            .route("/api/health", get(get_health))
            .with_state(state);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        });
        let task = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "fleet api server exited with error");
            }
        });

        Ok(FleetApiHandle {
            address: local_addr,
            task,
            shutdown: shutdown_tx,
        })
    }
}

/// Handle returned from [`FleetApiBuilder::spawn`].
pub struct FleetApiHandle {
    address: SocketAddr,
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl FleetApiHandle {
    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Request graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(()) => Ok(()),
            Err(join) => Err(anyhow::anyhow!(join)),
        }
    }
}

struct ApiState {
    provider: Arc<dyn FleetProvider>,
    title: String,
}

async fn get_fleet(State(state): State<Arc<ApiState>>) -> Response {
    match state.provider.status() {
        FleetStatus::Ready { table } => (StatusCode::OK, Json(table)).into_response(),
        FleetStatus::Pending => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "no refresh cycle has completed yet" })),
        )
            .into_response(),
        FleetStatus::Failed { tick, error } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "tick": tick, "error": error })),
        )
            .into_response(),
    }
}

async fn get_health(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    let (tick, last_refresh_ok) = match state.provider.status() {
        FleetStatus::Pending => (None, false),
        FleetStatus::Ready { table } => (Some(table.tick), true),
        FleetStatus::Failed { tick, .. } => (Some(tick), false),
    };
    Json(json!({
        "status": "ok",
        "title": state.title,
        "tick": tick,
        "last_refresh_ok": last_refresh_ok,
    }))
}
