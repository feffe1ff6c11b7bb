//! ---
//! smartbin_section: "12-dashboard"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "One-shot fleet table export as JSON or CSV."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use smartbin_core::FleetTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Explicit format wins; otherwise stdout gets JSON and files go by extension.
pub fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = override_format {
        return format;
    }
    if path.as_os_str() == "-" {
        return OutputFormat::Json;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => OutputFormat::Csv,
        _ => OutputFormat::Json,
    }
}

pub fn write_table(table: &FleetTable, output: &Path, format: OutputFormat) -> Result<()> {
    let mut writer: Box<dyn Write> = if output.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(
            File::create(output)
                .with_context(|| format!("failed to create output file {}", output.display()))?,
        )
    };
    match format {
        OutputFormat::Csv => table
            .write_csv(&mut writer)
            .context("failed to write fleet table as csv")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, table)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_core::telemetry::{Coordinates, NormalizedTelemetry};
    use smartbin_core::{assemble, BinViewModel, DeviceState};
    use std::fs;
    use tempfile::tempdir;

    fn table() -> FleetTable {
        let telemetry = NormalizedTelemetry {
            position: Coordinates::new(5.404, 100.302),
            state: DeviceState::Jammed,
            fill: 97.5,
        };
        assemble(3, BinViewModel::live(&telemetry, "Lebuh Pantai"), Vec::new())
    }

    #[test]
    fn format_follows_flag_then_target() {
        assert_eq!(determine_format(Path::new("-"), None), OutputFormat::Json);
        assert_eq!(determine_format(Path::new("fleet.csv"), None), OutputFormat::Csv);
        assert_eq!(determine_format(Path::new("fleet.out"), None), OutputFormat::Json);
        assert_eq!(
            determine_format(Path::new("fleet.json"), Some(OutputFormat::Csv)),
            OutputFormat::Csv
        );
    }

    #[test]
    fn writes_json_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fleet.json");
        write_table(&table(), &path, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["tick"], 3);
        assert_eq!(parsed["rows"][0]["name"], "Bin A (LIVE)");
        assert_eq!(parsed["rows"][0]["state"], "JAMMED");
    }

    #[test]
    fn writes_csv_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fleet.csv");
        write_table(&table(), &path, OutputFormat::Csv).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), FleetTable::COLUMNS.join(","));
        let live = lines.next().unwrap();
        assert!(live.starts_with("Bin A (LIVE),97.5,JAMMED,"));
        assert!(lines.next().is_none());
    }
}
