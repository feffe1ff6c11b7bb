//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Pipeline wiring from configuration."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use smartbin_common::AppConfig;
use smartbin_core::telemetry::Coordinates;
use smartbin_core::{DisabledGeocoder, Geocoder, PipelineSettings, RefreshPipeline};
use tracing::info;

use crate::errors::NetError;
use crate::firebase::FirebaseSource;
use crate::geocode::NominatimGeocoder;

/// Pipeline wired to the Firebase store and the configured geocoder.
pub type DashboardPipeline = RefreshPipeline<FirebaseSource, Box<dyn Geocoder>>;

/// Pipeline settings derived from configuration.
pub fn pipeline_settings(config: &AppConfig) -> PipelineSettings {
    PipelineSettings {
        refresh_interval: config.dashboard.refresh_interval,
        fallback: Coordinates::new(config.fleet.fallback_lat, config.fleet.fallback_lng),
        seed: config.fleet.seed,
    }
}

/// Build the refresh pipeline for a new dashboard session.
pub fn pipeline_from_config(config: &AppConfig) -> Result<DashboardPipeline, NetError> {
    let source = FirebaseSource::from_config(&config.store)?;
    let geocoder: Box<dyn Geocoder> = if config.geocoder.enabled {
        Box::new(NominatimGeocoder::from_config(&config.geocoder)?)
    } else {
        info!("reverse geocoding disabled; live bin address will show a placeholder");
        Box::new(DisabledGeocoder)
    };
    info!(
        endpoint = %source.endpoint(),
        refresh_secs = config.dashboard.refresh_interval.as_secs(),
        "telemetry pipeline configured"
    );
    Ok(RefreshPipeline::new(source, geocoder, pipeline_settings(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_core::TelemetrySource;
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn settings_follow_configuration() {
        let config = AppConfig::from_str(
            r#"
            [store]
            database_url = "https://example.firebasedatabase.app"

            [dashboard]
            refresh_interval_secs = 5

            [fleet]
            seed = 9
            fallback_lat = 1.5
            fallback_lng = 103.8
            "#,
        )
        .unwrap();
        let settings = pipeline_settings(&config);
        assert_eq!(settings.refresh_interval, Duration::from_secs(5));
        assert_eq!(settings.fallback, Coordinates::new(1.5, 103.8));
        assert_eq!(settings.seed, Some(9));
        let pipeline = pipeline_from_config(&config).unwrap();
        assert_eq!(pipeline.source().path(), "/smartbin");
    }
}
