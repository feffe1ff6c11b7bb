//! ---
//! smartbin_section: "01-core-functionality"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Shared primitives for the dashboard binaries."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
//! Shared primitives for the Smart Bin dashboard workspace.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the terminal dashboard and the daemon.

pub mod config;
pub mod logging;

pub use config::{
    ApiConfig, AppConfig, DashboardConfig, FleetConfig, GeocoderConfig, LoadedAppConfig,
    LoggingConfig, StoreConfig,
};
pub use logging::{init_tracing, LogFormat, LogTarget};
