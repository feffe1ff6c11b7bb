//! ---
//! smartbin_section: "12-dashboard"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Dashboard state: latest cycle outcome and row selection."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use smartbin_common::DashboardConfig;
use smartbin_core::{BinViewModel, FleetTable, PipelineError};

/// Result of the most recent refresh as the screen sees it.
pub enum Outcome {
    Waiting,
    Ready(FleetTable),
    Failed { tick: u64, message: String },
}

pub struct App {
    pub title: String,
    pub caption: String,
    pub outcome: Outcome,
    selected: usize,
    tick: u64,
}

impl App {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            caption: config.caption.clone(),
            outcome: Outcome::Waiting,
            selected: 0,
            tick: 0,
        }
    }

    /// Advance the refresh counter and return the new tick.
    pub fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Record a finished cycle. A failure replaces the previous table.
    pub fn apply(&mut self, tick: u64, result: Result<FleetTable, PipelineError>) {
        self.outcome = match result {
            Ok(table) => {
                if self.selected >= table.len() {
                    self.selected = table.len().saturating_sub(1);
                }
                Outcome::Ready(table)
            }
            Err(err) => Outcome::Failed {
                tick,
                message: err.to_string(),
            },
        };
    }

    pub fn table(&self) -> Option<&FleetTable> {
        match &self.outcome {
            Outcome::Ready(table) => Some(table),
            _ => None,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&BinViewModel> {
        self.table().and_then(|table| table.get(self.selected))
    }

    pub fn select_next(&mut self) {
        let len = self.table().map_or(0, FleetTable::len);
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_core::telemetry::{Coordinates, NormalizedTelemetry};
    use smartbin_core::{assemble, DeviceState};

    fn table(tick: u64) -> FleetTable {
        let telemetry = NormalizedTelemetry {
            position: Coordinates::FALLBACK,
            state: DeviceState::Extending,
            fill: 40.0,
        };
        let live = BinViewModel::live(&telemetry, "George Town");
        let mut neighbour = live.clone();
        neighbour.name = "Bin B".into();
        neighbour.live = false;
        assemble(tick, live, vec![neighbour])
    }

    #[test]
    fn selection_is_bounded_by_the_table() {
        let mut app = App::new(&DashboardConfig::default());
        app.select_next();
        assert_eq!(app.selected(), 0);

        let tick = app.next_tick();
        app.apply(tick, Ok(table(tick)));
        app.select_next();
        app.select_next();
        assert_eq!(app.selected(), 1);
        assert_eq!(app.selected_row().unwrap().name, "Bin B");
        app.select_previous();
        app.select_previous();
        assert_eq!(app.selected(), 0);
    }

    #[test]
    fn failed_cycle_replaces_the_table() {
        let mut app = App::new(&DashboardConfig::default());
        let tick = app.next_tick();
        app.apply(tick, Ok(table(tick)));
        assert!(app.table().is_some());

        let tick = app.next_tick();
        app.apply(
            tick,
            Err(PipelineError::EmptyTelemetry {
                path: "/smartbin".into(),
            }),
        );
        assert!(app.table().is_none());
        match &app.outcome {
            Outcome::Failed { tick, message } => {
                assert_eq!(*tick, 2);
                assert_eq!(message, "no data found at /smartbin");
            }
            _ => panic!("expected a failed outcome"),
        }

        let tick = app.next_tick();
        app.apply(tick, Ok(table(tick)));
        assert_eq!(app.table().unwrap().tick, 3);
    }
}
