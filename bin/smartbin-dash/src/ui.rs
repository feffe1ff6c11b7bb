//! ---
//! smartbin_section: "12-dashboard"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Terminal rendering of the fleet table, map and live bin panel."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
//! ┌───────────────────────────────────────────────────────┐
//! │ title · caption                                       │
//! ├───────────────────┬───────────────────────────────────┤
//! │ live bin          │ fleet table                       │
//! │ (gauge, status)   │                                   │
//! ├───────────────────┤                                   │
//! │ map               ├───────────────────────────────────┤
//! │                   │ selected bin                      │
//! ├───────────────────┴───────────────────────────────────┤
//! │ tick · refreshed at · keys                            │
//! └───────────────────────────────────────────────────────┘
use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use smartbin_core::{BinViewModel, FleetTable, MarkerColor};

use crate::app::{App, Outcome};

/// Degrees of padding around the plotted markers.
const MAP_PADDING_DEG: f64 = 0.002;

pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, rows[0], app);
    match &app.outcome {
        Outcome::Waiting => {
            let waiting = Paragraph::new("Fetching telemetry…")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(waiting, rows[1]);
        }
        Outcome::Ready(table) => draw_fleet(frame, rows[1], app, table),
        Outcome::Failed { tick, message } => draw_error(frame, rows[1], *tick, message),
    }
    draw_footer(frame, rows[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", app.caption),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, area);
}

fn draw_fleet(frame: &mut Frame, area: Rect, app: &App, table: &FleetTable) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(6)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(7)])
        .split(columns[1]);

    if let Some(live) = table.live() {
        draw_live(frame, left[0], live);
    }
    draw_map(frame, left[1], table, app.selected());
    draw_table(frame, right[0], table, app.selected());
    if let Some(row) = app.selected_row() {
        draw_detail(frame, right[1], row);
    }
}

fn draw_live(frame: &mut Frame, area: Rect, live: &BinViewModel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", live.name),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(fill_style(live.fill))
        .ratio((live.fill / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.1}% full", live.fill));
    frame.render_widget(gauge, parts[0]);

    let status = Paragraph::new(vec![
        Line::from(vec![Span::raw("State    "), Span::raw(live.state.as_str())]),
        Line::from(vec![
            Span::raw("Status   "),
            Span::styled(live.message.as_str(), message_style(live.urgent)),
        ]),
        Line::from(vec![Span::raw("Address  "), Span::raw(live.address.as_str())]),
        Line::from(Span::styled(
            format!("{:.5}, {:.5}", live.lat, live.lon),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(status, parts[1]);
}

fn draw_map(frame: &mut Frame, area: Rect, table: &FleetTable, selected: usize) {
    let (x_bounds, y_bounds) = map_bounds(table.rows());
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" Map "))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for row in table.rows() {
                ctx.draw(&Points {
                    coords: &[(row.lon, row.lat)],
                    color: marker_color(row.color),
                });
            }
            if let Some(row) = table.get(selected) {
                ctx.print(
                    row.lon,
                    row.lat,
                    Span::styled(
                        format!("◆ {}", row.name),
                        Style::default().fg(Color::Yellow),
                    ),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_table(frame: &mut Frame, area: Rect, table: &FleetTable, selected: usize) {
    let header = Row::new(["Bin", "Fill", "State", "Status", "Lat", "Lon"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .map(|row| {
            let name_style = Style::default().fg(marker_color(row.color));
            Row::new(vec![
                Cell::from(Span::styled(row.name.clone(), name_style)),
                Cell::from(format!("{:>5.1}%", row.fill)),
                Cell::from(row.state.as_str()),
                Cell::from(Span::styled(row.message.clone(), message_style(row.urgent))),
                Cell::from(format!("{:.5}", row.lat)),
                Cell::from(format!("{:.5}", row.lon)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(13),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(10),
    ];
    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Fleet "))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn draw_detail(frame: &mut Frame, area: Rect, row: &BinViewModel) {
    let source = if row.live { "live sensor" } else { "simulated" };
    let detail = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                row.name.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({source})"), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!("Fill     {:.1}%", row.fill)),
        Line::from(vec![
            Span::raw("Status   "),
            Span::styled(row.message.as_str(), message_style(row.urgent)),
        ]),
        Line::from(format!("Address  {}", row.address)),
        Line::from(format!("Position {:.5}, {:.5}", row.lat, row.lon)),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" Selected "));
    frame.render_widget(detail, area);
}

fn draw_error(frame: &mut Frame, area: Rect, tick: u64, message: &str) {
    let panel = Paragraph::new(vec![
        Line::from(Span::styled(
            capitalize(message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("refresh #{tick} failed; retrying on the next tick"),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Error "),
    );
    frame.render_widget(panel, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let refreshed = app
        .table()
        .map(|table| {
            table
                .refreshed_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "--:--:--".to_owned());
    let footer = Paragraph::new(format!(
        "refresh #{}  at {}   ↑/↓ or j/k select  r refresh  q quit",
        app.tick(),
        refreshed
    ))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, area);
}

fn fill_style(fill: f64) -> Style {
    let color = if fill >= 85.0 {
        Color::Red
    } else if fill >= 60.0 {
        Color::Yellow
    } else {
        Color::Green
    };
    Style::default().fg(color).bg(Color::Black)
}

fn message_style(urgent: bool) -> Style {
    if urgent {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Terminals have no alpha channel; the RGB part is used as-is.
fn marker_color(color: MarkerColor) -> Color {
    let [r, g, b, _] = color.rgba();
    Color::Rgb(r, g, b)
}

/// Canvas bounds covering every marker, padded so edge markers stay visible.
fn map_bounds(rows: &[BinViewModel]) -> ([f64; 2], [f64; 2]) {
    let mut lon = [f64::INFINITY, f64::NEG_INFINITY];
    let mut lat = [f64::INFINITY, f64::NEG_INFINITY];
    for row in rows {
        lon = [lon[0].min(row.lon), lon[1].max(row.lon)];
        lat = [lat[0].min(row.lat), lat[1].max(row.lat)];
    }
    if !lon[0].is_finite() || !lat[0].is_finite() {
        return ([-180.0, 180.0], [-90.0, 90.0]);
    }
    (
        [lon[0] - MAP_PADDING_DEG, lon[1] + MAP_PADDING_DEG],
        [lat[0] - MAP_PADDING_DEG, lat[1] + MAP_PADDING_DEG],
    )
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
