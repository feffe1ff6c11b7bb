//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "One refresh cycle: fetch, normalise, assemble."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::assembler::{assemble, FleetTable};
use crate::cache::TelemetryCache;
use crate::errors::{PipelineError, Result};
use crate::fleet::generate_synthetic_fleet;
use crate::model::BinViewModel;
use crate::session::SessionContext;
use crate::sources::{Geocoder, TelemetrySource};
use crate::telemetry::{normalize, Coordinates, TelemetryRecord};

/// Knobs supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Also the telemetry cache lifetime.
    pub refresh_interval: Duration,
    pub fallback: Coordinates,
    pub seed: Option<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(3),
            fallback: Coordinates::FALLBACK,
            seed: None,
        }
    }
}

/// Runs one fetch to fleet-table cycle per [`RefreshPipeline::refresh`] call.
/// Scheduling is left to the caller.
#[derive(Debug)]
pub struct RefreshPipeline<S, G> {
    source: S,
    geocoder: G,
    cache: TelemetryCache,
    session: SessionContext,
    fallback: Coordinates,
}

impl<S, G> RefreshPipeline<S, G>
where
    S: TelemetrySource,
    G: Geocoder,
{
    pub fn new(source: S, geocoder: G, settings: PipelineSettings) -> Self {
        Self {
            source,
            geocoder,
            cache: TelemetryCache::new(settings.refresh_interval),
            session: SessionContext::new(settings.seed),
            fallback: settings.fallback,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Drop the cached fetch so the next cycle reads the store.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Produce the fleet table for `tick`. Any error ends this cycle only.
    pub async fn refresh(&mut self, tick: u64) -> Result<FleetTable> {
        let path = self.source.path().to_owned();
        debug!(tick, %path, "refresh cycle started");

        let raw = self.cache.get_or_fetch(&self.source).await.map_err(|err| {
            warn!(tick, %path, error = %err, "telemetry fetch failed");
            PipelineError::from(err)
        })?;
        let record = TelemetryRecord::from_fetch(raw, &path).inspect_err(|err| {
            warn!(tick, %path, error = %err, "refresh cycle halted");
        })?;
        let telemetry = normalize(&record, self.fallback);

        let address = self
            .session
            .resolve_address(&self.geocoder, telemetry.position)
            .await
            .to_owned();
        let live = BinViewModel::live(&telemetry, address);

        let offsets = self.session.offsets().clone();
        let synthetic =
            generate_synthetic_fleet(self.session.rng_mut(), telemetry.position, &offsets);

        let table = assemble(tick, live, synthetic);
        info!(
            tick,
            rows = table.len(),
            state = %telemetry.state,
            fill = telemetry.fill,
            urgent = table.urgent().count(),
            "refresh cycle complete"
        );
        Ok(table)
    }
}
