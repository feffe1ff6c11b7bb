//! ---
//! smartbin_section: "01-core-functionality"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Configuration surface for the dashboard binaries."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

fn default_store_path() -> String {
    "/smartbin".to_owned()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_geocoder_enabled() -> bool {
    true
}

fn default_geocoder_endpoint() -> String {
    "https://nominatim.openstreetmap.org".to_owned()
}

fn default_user_agent() -> String {
    "smart_bin_dashboard".to_owned()
}

fn default_title() -> String {
    "Smart City Waste Monitoring Dashboard".to_owned()
}

fn default_caption() -> String {
    "1 Live IoT Smart Bin + 11 Simulated Neighbor Bins".to_owned()
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_fallback_lat() -> f64 {
    5.35888
}

fn default_fallback_lng() -> f64 {
    100.30099
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8088))
}

/// Primary configuration object for the dashboard and daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "SMARTBIN_CONFIG";
    pub const ENV_STORE_TOKEN: &'static str = "SMARTBIN_STORE_TOKEN";

    /// Load configuration from disk, respecting the `SMARTBIN_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let mut config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.apply_token_override(std::env::var(Self::ENV_STORE_TOKEN).ok());
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Replace the store credential when a non-empty override is supplied.
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.store.auth_token = Some(token);
        }
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.geocoder.validate()?;
        self.dashboard.validate()?;
        self.fleet.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Location and credentials of the remote telemetry store.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout", rename = "timeout_secs")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        parse_http_url("store.database_url", &self.database_url)?;
        if self.path.trim().is_empty() {
            return Err(anyhow!("store.path must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(anyhow!("store.timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_enabled")]
    pub enabled: bool,
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout", rename = "timeout_secs")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: default_geocoder_enabled(),
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            timeout: default_request_timeout(),
        }
    }
}

impl GeocoderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        parse_http_url("geocoder.endpoint", &self.endpoint)?;
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("geocoder.user_agent must not be empty"));
        }
        Ok(())
    }
}

/// Presentation settings shared by the dashboard and the daemon.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_caption")]
    pub caption: String,
    #[serde(default = "default_refresh_interval", rename = "refresh_interval_secs")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub refresh_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            caption: default_caption(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(anyhow!("dashboard.title must not be empty"));
        }
        if self.refresh_interval.is_zero() {
            return Err(anyhow!(
                "dashboard.refresh_interval_secs must be greater than zero"
            ));
        }
        Ok(())
    }
}

/// Synthetic fleet and coordinate fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,
    #[serde(default = "default_fallback_lng")]
    pub fallback_lng: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fallback_lat: default_fallback_lat(),
            fallback_lng: default_fallback_lng(),
        }
    }
}

impl FleetConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.fallback_lat) {
            return Err(anyhow!(
                "fleet.fallback_lat {} is outside [-90, 90]",
                self.fallback_lat
            ));
        }
        if !(-180.0..=180.0).contains(&self.fallback_lng) {
            return Err(anyhow!(
                "fleet.fallback_lng {} is outside [-180, 180]",
                self.fallback_lng
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            listen: default_api_listen(),
        }
    }
}

fn parse_http_url(field: &str, raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(anyhow!("{field} must not be empty"));
    }
    let url = Url::parse(raw).with_context(|| format!("{field} is not a valid URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("{field} must use http or https, found {other}")),
    }
}
