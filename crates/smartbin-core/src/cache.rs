//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Short-lived memoisation of telemetry fetches."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::errors::SourceError;
use crate::sources::TelemetrySource;

#[derive(Debug, Clone)]
struct CachedFetch {
    fetched_at: Instant,
    value: Value,
}

/// Keeps the last successful fetch for `ttl` so the store is polled at most
/// once per refresh interval. Errors are never cached.
#[derive(Debug, Clone)]
pub struct TelemetryCache {
    ttl: Duration,
    entry: Option<CachedFetch>,
}

impl TelemetryCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.ttl)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub async fn get_or_fetch<S>(&mut self, source: &S) -> Result<Value, SourceError>
    where
        S: TelemetrySource + ?Sized,
    {
        if let Some(entry) = self.entry.as_ref().filter(|_| self.is_fresh()) {
            debug!(path = source.path(), "telemetry cache hit");
            return Ok(entry.value.clone());
        }
        debug!(path = source.path(), "telemetry cache miss");
        let value = source.fetch().await?;
        self.entry = Some(CachedFetch {
            fetched_at: Instant::now(),
            value: value.clone(),
        });
        Ok(value)
    }
}
