//! ---
//! smartbin_section: "12-dashboard"
//! smartbin_subsection: "binary"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Terminal dashboard launcher and one-shot exporter."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
mod app;
mod export;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use smartbin_common::{init_tracing, AppConfig, LogTarget};
use smartbin_net::{pipeline_from_config, DashboardPipeline};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::app::App;
use crate::export::{determine_format, write_table, OutputFormat};

/// Upper bound on how long input polling may delay a redraw.
const POLL_CEILING: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Live dashboard for the smart bin and its simulated neighbours",
    long_about = None
)]
struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the refresh interval in seconds
    #[arg(long, value_name = "SECS")]
    refresh: Option<u64>,

    /// Seed for reproducible synthetic bins
    #[arg(long)]
    seed: Option<u64>,

    /// Run a single refresh cycle and write the fleet table instead of starting the UI
    #[arg(long)]
    once: bool,

    /// Export format for --once (defaults from the output extension)
    #[arg(long, value_enum, requires = "once")]
    format: Option<OutputFormat>,

    /// Export target for --once. Use '-' for stdout.
    #[arg(long, default_value = "-")]
    output: PathBuf,
}

type DashTerminal = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing("smartbin-dash", &config.logging, LogTarget::FileOnly)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let pipeline = pipeline_from_config(&config)?;

    if cli.once {
        let format = determine_format(&cli.output, cli.format);
        return run_once(&runtime, pipeline, &cli.output, format);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run_app(&mut terminal, &runtime, pipeline, &config);
    cleanup_terminal(&mut terminal)?;
    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/smartbin.toml"));
    candidates.push(PathBuf::from("smartbin.toml"));

    let mut config = AppConfig::load(&candidates)?;
    if let Some(secs) = cli.refresh {
        if secs == 0 {
            return Err(anyhow!("--refresh must be greater than zero"));
        }
        config.dashboard.refresh_interval = Duration::from_secs(secs);
    }
    if cli.seed.is_some() {
        config.fleet.seed = cli.seed;
    }
    Ok(config)
}

fn run_once(
    runtime: &Runtime,
    mut pipeline: DashboardPipeline,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let table = runtime
        .block_on(pipeline.refresh(1))
        .context("refresh cycle failed")?;
    write_table(&table, output, format)?;
    if output.as_os_str() != "-" {
        eprintln!("wrote {} bins -> {}", table.len(), output.display());
    }
    Ok(())
}

fn cleanup_terminal(terminal: &mut DashTerminal) -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()?;
    Ok(())
}

enum Action {
    None,
    Refresh,
    Quit,
}

fn run_app(
    terminal: &mut DashTerminal,
    runtime: &Runtime,
    mut pipeline: DashboardPipeline,
    config: &AppConfig,
) -> Result<()> {
    let mut app = App::new(&config.dashboard);
    let interval = config.dashboard.refresh_interval;
    let mut next_refresh = Instant::now();
    info!(interval_secs = interval.as_secs(), "dashboard started");
    loop {
        if Instant::now() >= next_refresh {
            let tick = app.next_tick();
            let result = runtime.block_on(pipeline.refresh(tick));
            if let Err(err) = &result {
                warn!(tick, error = %err, "refresh cycle failed");
            }
            app.apply(tick, result);
            next_refresh = Instant::now() + interval;
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        let wait = next_refresh
            .saturating_duration_since(Instant::now())
            .min(POLL_CEILING);
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                match handle_input(&mut app, key) {
                    Action::Quit => break,
                    Action::Refresh => {
                        pipeline.invalidate_cache();
                        next_refresh = Instant::now();
                    }
                    Action::None => {}
                }
            }
        }
    }
    info!(ticks = app.tick(), "dashboard stopped");
    Ok(())
}

fn handle_input(app: &mut App, key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Refresh,
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            Action::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous();
            Action::None
        }
        _ => Action::None,
    }
}
