//! ---
//! smartbin_section: "01-core-functionality"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Tracing subscriber initialisation."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "SMARTBIN_LOG";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
static STDOUT_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Available log formats for stdout output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Where log events are written besides the rolling file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Mirror events to stdout in the configured format.
    StdoutAndFile,
    /// Rolling file only; used when stdout is owned by the terminal UI.
    FileOnly,
}

/// Initialize the tracing subscriber based on configuration and environment variables.
///
/// * `SMARTBIN_LOG` overrides the filter (e.g. `info`, `smartbin_core=debug`).
///   When unset the standard `RUST_LOG` variable is honoured, finally defaulting
///   to `info`.
/// * A rolling daily JSON log file is always written under `config.directory`.
pub fn init_tracing(service_name: &str, config: &LoggingConfig, target: LogTarget) -> Result<()> {
    std::fs::create_dir_all(&config.directory)?;
    let prefix = config
        .file_prefix
        .clone()
        .unwrap_or_else(|| service_name.to_owned());

    let file_appender = daily(
        &config.directory,
        format!("{}-{}.log", prefix, service_name),
    );
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(file_guard);

    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to info logging",
                LOG_ENV, err
            );
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stdout_layer = match target {
        LogTarget::FileOnly => None,
        LogTarget::StdoutAndFile => {
            let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
            let _ = STDOUT_GUARD.set(stdout_guard);
            let layer = match config.format {
                LogFormat::StructuredJson => fmt::layer()
                    .with_target(false)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .json()
                    .with_writer(stdout_writer)
                    .boxed(),
                LogFormat::Pretty => fmt::layer()
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(stdout_writer)
                    .boxed(),
            };
            Some(layer)
        }
    };

    let file_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .with_writer(file_writer)
        .boxed();

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .ok();

    info!(service = %service_name, log_dir = %config.directory.display(), format = ?config.format, "tracing initialised");
    Ok(())
}
