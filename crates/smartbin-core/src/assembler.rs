//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Fleet table assembly and export."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fleet::SYNTHETIC_BIN_COUNT;
use crate::model::BinViewModel;
use crate::status::DeviceState;

/// One live bin plus the synthetic neighbours.
pub const FLEET_SIZE: usize = 1 + SYNTHETIC_BIN_COUNT;

/// Ordered rows handed to the rendering layer each refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetTable {
    pub tick: u64,
    pub refreshed_at: DateTime<Utc>,
    rows: Vec<BinViewModel>,
}

impl FleetTable {
    pub const COLUMNS: [&'static str; 10] = [
        "name", "fill", "state", "message", "urgent", "lat", "lon", "live", "address", "color",
    ];

    pub fn rows(&self) -> &[BinViewModel] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BinViewModel> {
        self.rows.get(index)
    }

    /// The physical bin; always row 0.
    pub fn live(&self) -> Option<&BinViewModel> {
        self.rows.first().filter(|row| row.live)
    }

    pub fn urgent(&self) -> impl Iterator<Item = &BinViewModel> {
        self.rows.iter().filter(|row| row.urgent)
    }

    /// Write the rows as CSV with a header matching [`FleetTable::COLUMNS`].
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(CsvRow::from(row))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    fill: f64,
    state: DeviceState,
    message: &'a str,
    urgent: bool,
    lat: f64,
    lon: f64,
    live: bool,
    address: &'a str,
    color: String,
}

impl<'a> From<&'a BinViewModel> for CsvRow<'a> {
    fn from(row: &'a BinViewModel) -> Self {
        let [r, g, b, a] = row.color.rgba();
        Self {
            name: &row.name,
            fill: row.fill,
            state: row.state,
            message: &row.message,
            urgent: row.urgent,
            lat: row.lat,
            lon: row.lon,
            live: row.live,
            address: &row.address,
            color: format!("{r},{g},{b},{a}"),
        }
    }
}

/// Concatenate the live bin and the synthetic bins, live first.
pub fn assemble(tick: u64, live: BinViewModel, synthetic: Vec<BinViewModel>) -> FleetTable {
    let mut rows = Vec::with_capacity(1 + synthetic.len());
    rows.push(live);
    rows.extend(synthetic);
    FleetTable {
        tick,
        refreshed_at: Utc::now(),
        rows,
    }
}
