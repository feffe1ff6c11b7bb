//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Per-session state held across refresh cycles."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use rand::prelude::*;
use tracing::{info, warn};

use crate::fleet::FleetOffsets;
use crate::sources::Geocoder;
use crate::telemetry::Coordinates;

pub const RESOLVING_ADDRESS: &str = "Resolving address...";
pub const UNKNOWN_LOCATION: &str = "Unknown location";
pub const ADDRESS_UNAVAILABLE: &str = "Address unavailable";

/// Reverse-geocoded address of the live bin. Locked after the first attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSlot {
    Pending,
    Resolved(String),
}

impl AddressSlot {
    pub fn as_str(&self) -> &str {
        match self {
            AddressSlot::Pending => RESOLVING_ADDRESS,
            AddressSlot::Resolved(address) => address,
        }
    }
}

/// State that lives for a whole dashboard session: the RNG, the synthetic
/// position offsets and the resolved address.
#[derive(Debug)]
pub struct SessionContext {
    rng: StdRng,
    offsets: FleetOffsets,
    address: AddressSlot,
}

impl SessionContext {
    /// Start a session. A seed makes synthetic offsets and fills reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let offsets = FleetOffsets::generate(&mut rng);
        Self {
            rng,
            offsets,
            address: AddressSlot::Pending,
        }
    }

    pub fn offsets(&self) -> &FleetOffsets {
        &self.offsets
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    pub fn address_slot(&self) -> &AddressSlot {
        &self.address
    }

    /// Resolve the address on the first call only; later calls return the
    /// stored value without touching the geocoder. Failures degrade to a
    /// placeholder and still lock the slot. A disabled geocoder is never called.
    pub async fn resolve_address<G>(&mut self, geocoder: &G, at: Coordinates) -> &str
    where
        G: Geocoder + ?Sized,
    {
        if let AddressSlot::Pending = self.address {
            if !geocoder.is_enabled() {
                info!("reverse geocoding disabled; live bin address not resolved");
                self.address = AddressSlot::Resolved(ADDRESS_UNAVAILABLE.to_owned());
                return self.address.as_str();
            }
            let resolved = match geocoder.reverse(at.lat, at.lon).await {
                Ok(Some(address)) => {
                    info!(lat = at.lat, lon = at.lon, %address, "live bin address resolved");
                    address
                }
                Ok(None) => {
                    info!(lat = at.lat, lon = at.lon, "no address found for live bin");
                    UNKNOWN_LOCATION.to_owned()
                }
                Err(err) => {
                    warn!(error = %err, lat = at.lat, lon = at.lon, "reverse geocoding failed");
                    ADDRESS_UNAVAILABLE.to_owned()
                }
            };
            self.address = AddressSlot::Resolved(resolved);
        }
        self.address.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingGeocoder {
        calls: AtomicUsize,
        reply: Result<Option<String>, SourceError>,
    }

    impl CountingGeocoder {
        fn new(reply: Result<Option<String>, SourceError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply,
            }
        }
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn reverse(&self, _lat: f64, _lon: f64) -> Result<Option<String>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn address_is_resolved_once() {
        let geocoder = CountingGeocoder::new(Ok(Some("George Town, Penang".into())));
        let mut session = SessionContext::new(Some(1));
        assert_eq!(session.address(), RESOLVING_ADDRESS);
        let first = session
            .resolve_address(&geocoder, Coordinates::FALLBACK)
            .await
            .to_owned();
        let second = session
            .resolve_address(&geocoder, Coordinates::new(1.0, 1.0))
            .await
            .to_owned();
        assert_eq!(first, "George Town, Penang");
        assert_eq!(second, first);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_degrades_to_placeholder_and_locks() {
        let geocoder = CountingGeocoder::new(Err(SourceError::Timeout(Duration::from_secs(10))));
        let mut session = SessionContext::new(Some(1));
        let address = session
            .resolve_address(&geocoder, Coordinates::FALLBACK)
            .await
            .to_owned();
        assert_eq!(address, ADDRESS_UNAVAILABLE);
        session.resolve_address(&geocoder, Coordinates::FALLBACK).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            session.address_slot(),
            &AddressSlot::Resolved(ADDRESS_UNAVAILABLE.to_owned())
        );
    }

    #[tokio::test]
    async fn no_result_reports_unknown_location() {
        let geocoder = CountingGeocoder::new(Ok(None));
        let mut session = SessionContext::new(None);
        let address = session
            .resolve_address(&geocoder, Coordinates::FALLBACK)
            .await;
        assert_eq!(address, UNKNOWN_LOCATION);
    }

    struct SwitchedOff(CountingGeocoder);

    #[async_trait]
    impl Geocoder for SwitchedOff {
        async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, SourceError> {
            self.0.reverse(lat, lon).await
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn disabled_geocoder_is_never_called() {
        let geocoder = SwitchedOff(CountingGeocoder::new(Ok(Some("unused".into()))));
        let mut session = SessionContext::new(Some(3));
        let address = session
            .resolve_address(&geocoder, Coordinates::FALLBACK)
            .await
            .to_owned();
        assert_eq!(address, ADDRESS_UNAVAILABLE);
        assert_eq!(geocoder.0.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            session.address_slot(),
            &AddressSlot::Resolved(ADDRESS_UNAVAILABLE.to_owned())
        );
    }

    #[tokio::test]
    async fn boxed_disabled_geocoder_reports_disabled() {
        let geocoder: Box<dyn Geocoder> = Box::new(crate::sources::DisabledGeocoder);
        assert!(!geocoder.is_enabled());
        let mut session = SessionContext::new(Some(4));
        let address = session
            .resolve_address(&geocoder, Coordinates::FALLBACK)
            .await;
        assert_eq!(address, ADDRESS_UNAVAILABLE);
    }

    #[test]
    fn seeded_sessions_share_offsets() {
        let a = SessionContext::new(Some(42));
        let b = SessionContext::new(Some(42));
        assert_eq!(a.offsets(), b.offsets());
    }
}
