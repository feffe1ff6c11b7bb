//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Synthetic neighbour bins for fleet-scale visualisation."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::ops::RangeInclusive;

use rand::prelude::*;
use rand_distr::Normal;

use crate::model::BinViewModel;
use crate::status::StatusMessage;
use crate::telemetry::Coordinates;

pub const SYNTHETIC_BIN_COUNT: usize = 11;
/// Standard deviation, in degrees, of the per-bin position jitter.
pub const OFFSET_SIGMA_DEG: f64 = 0.002;
pub const FILL_RANGE: RangeInclusive<u8> = 10..=98;
/// Fill above which a synthetic bin asks for pickup.
pub const PICKUP_THRESHOLD: u8 = 85;

pub const SIMULATED_PLACES: [&str; SYNTHETIC_BIN_COUNT] = [
    "Central Park",
    "City Hall",
    "Library",
    "Museum",
    "Market",
    "Community Center",
    "Stadium",
    "University",
    "Hospital",
    "Mall",
    "Train Station",
];

/// Per-bin `(lat, lon)` offsets drawn once per session.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetOffsets([(f64, f64); SYNTHETIC_BIN_COUNT]);

impl FleetOffsets {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let normal = Normal::new(0.0, OFFSET_SIGMA_DEG).expect("sigma must be positive");
        let mut offsets = [(0.0, 0.0); SYNTHETIC_BIN_COUNT];
        for slot in offsets.iter_mut() {
            *slot = (normal.sample(rng), normal.sample(rng));
        }
        Self(offsets)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.0.iter()
    }
}

/// `Bin B` for index 0 through `Bin L` for index 10.
pub fn synthetic_name(index: usize) -> String {
    let letter = char::from(b'B' + index as u8);
    format!("Bin {letter}")
}

pub fn synthetic_status(fill: u8) -> StatusMessage {
    if fill > PICKUP_THRESHOLD {
        StatusMessage::PICKUP_REQUIRED
    } else {
        StatusMessage::OPERATING_NORMALLY
    }
}

/// Build the synthetic bins around `anchor`. Fills are redrawn on every call;
/// positions only depend on `offsets`.
pub fn generate_synthetic_fleet<R: Rng + ?Sized>(
    rng: &mut R,
    anchor: Coordinates,
    offsets: &FleetOffsets,
) -> Vec<BinViewModel> {
    offsets
        .iter()
        .zip(SIMULATED_PLACES)
        .enumerate()
        .map(|(index, (&(dlat, dlon), place))| {
            let fill = rng.gen_range(FILL_RANGE);
            BinViewModel::simulated(
                synthetic_name(index),
                fill,
                synthetic_status(fill),
                anchor.lat + dlat,
                anchor.lon + dlon,
                place,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkerColor;
    use crate::status::DeviceState;

    #[test]
    fn yields_eleven_bins_with_fills_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let offsets = FleetOffsets::generate(&mut rng);
        for _ in 0..50 {
            let bins = generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets);
            assert_eq!(bins.len(), SYNTHETIC_BIN_COUNT);
            for bin in &bins {
                assert!((10.0..=98.0).contains(&bin.fill));
                assert_eq!(bin.fill.fract(), 0.0);
                assert_eq!(bin.state, DeviceState::Simulated);
                assert_eq!(bin.color, MarkerColor::SIMULATED);
                assert!(!bin.live);
            }
        }
    }

    #[test]
    fn message_follows_pickup_threshold() {
        let mut rng = StdRng::seed_from_u64(11);
        let offsets = FleetOffsets::generate(&mut rng);
        for _ in 0..50 {
            for bin in generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets) {
                if bin.fill > 85.0 {
                    assert!(bin.urgent);
                    assert!(bin.message.contains("Pickup required"));
                } else {
                    assert!(!bin.urgent);
                    assert_eq!(bin.message, "Operating normally");
                }
            }
        }
    }

    #[test]
    fn threshold_boundary() {
        assert_eq!(synthetic_status(85), StatusMessage::OPERATING_NORMALLY);
        assert_eq!(synthetic_status(86), StatusMessage::PICKUP_REQUIRED);
    }

    #[test]
    fn names_and_places_follow_generation_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let offsets = FleetOffsets::generate(&mut rng);
        let bins = generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets);
        assert_eq!(bins[0].name, "Bin B");
        assert_eq!(bins[0].address, "Central Park");
        assert_eq!(bins[10].name, "Bin L");
        assert_eq!(bins[10].address, "Train Station");
    }

    #[test]
    fn positions_are_stable_for_fixed_offsets() {
        let mut rng = StdRng::seed_from_u64(5);
        let offsets = FleetOffsets::generate(&mut rng);
        let first = generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets);
        let second = generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!((a.lat, a.lon), (b.lat, b.lon));
        }
    }

    #[test]
    fn each_bin_sits_at_anchor_plus_its_own_offset() {
        let mut rng = StdRng::seed_from_u64(23);
        let offsets = FleetOffsets::generate(&mut rng);
        let anchor = Coordinates::new(-33.86882, 151.20930);
        let bins = generate_synthetic_fleet(&mut rng, anchor, &offsets);
        assert_eq!(bins.len(), offsets.iter().count());
        for (bin, &(dlat, dlon)) in bins.iter().zip(offsets.iter()) {
            assert_eq!(bin.lat, anchor.lat + dlat, "{}", bin.name);
            assert_eq!(bin.lon, anchor.lon + dlon, "{}", bin.name);
        }
        // lat and lon offsets are drawn independently
        assert!(offsets.iter().any(|&(dlat, dlon)| dlat != dlon));
    }

    #[test]
    fn bins_follow_a_moving_anchor() {
        let mut rng = StdRng::seed_from_u64(29);
        let offsets = FleetOffsets::generate(&mut rng);
        let here = generate_synthetic_fleet(&mut rng, Coordinates::FALLBACK, &offsets);
        let moved = Coordinates::new(
            Coordinates::FALLBACK.lat + 1.0,
            Coordinates::FALLBACK.lon - 2.0,
        );
        let there = generate_synthetic_fleet(&mut rng, moved, &offsets);
        for (a, b) in here.iter().zip(&there) {
            assert!((b.lat - a.lat - 1.0).abs() < 1e-9);
            assert!((b.lon - a.lon + 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn offsets_stay_near_the_anchor() {
        let mut rng = StdRng::seed_from_u64(99);
        let offsets = FleetOffsets::generate(&mut rng);
        for &(dlat, dlon) in offsets.iter() {
            // ten sigma
            assert!(dlat.abs() < 0.02 && dlon.abs() < 0.02);
        }
    }
}
