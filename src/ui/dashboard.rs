//! Dashboard header and weather section
//!
//! The header carries the connection status, last sync age, and data freshness.
//! The weather section shows current conditions, environmental readings, the
//! 24-hour overview, and the 7-day outlook.

use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;
use crate::app::{App, AppState};
use crate::data::{OperationalStatus, WeatherSnapshot};
use crate::format::{condition_code, format_timestamp, last_sync_text, wind_compass, Freshness};
use crate::refresh::{ConnectionStatus, RefreshSession};

fn status_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Online => colors::OK,
        ConnectionStatus::Reconnecting => colors::WARN,
        ConnectionStatus::Offline => colors::FAIL,
    }
}

fn freshness_color(freshness: Freshness) -> Color {
    match freshness {
        Freshness::Live => colors::OK,
        Freshness::Aging => colors::WARN,
        Freshness::Stale => colors::FAIL,
    }
}

/// Builds the single header line
fn header_line(app: &App) -> Line<'static> {
    let now = Utc::now();
    let session = &app.session;
    let freshness = app.freshness(now);

    let mut spans = vec![
        Span::styled(
            "WXDASH ",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("// {}", app.location.name),
            Style::default().fg(colors::PRIMARY),
        ),
        Span::raw("   "),
        Span::styled(
            session.status_label(),
            Style::default()
                .fg(status_color(session.connection_status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   LAST SYNC: {}", last_sync_text(session.last_updated, now)),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::raw("   "),
        Span::styled(
            freshness.label(),
            Style::default().fg(freshness_color(freshness)),
        ),
    ];

    if session.is_loading {
        spans.push(Span::styled(
            "   SYNCING...",
            Style::default().fg(colors::SECONDARY),
        ));
    }

    Line::from(spans)
}

/// Renders the bordered header
pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));
    frame.render_widget(Paragraph::new(header_line(app)).block(block), area);
}

/// Renders the weather section: two reading panels over the forecast panels
pub fn render_weather(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Min(6),
        ])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_status_panel(frame, panels[0], &app.session);
    render_environment_panel(frame, panels[1], app.session.weather_data.as_ref());
    super::forecast::render_overview(frame, rows[1], app);
    super::forecast::render(frame, rows[2], app);
}

fn panel(title: &'static str) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
}

fn label_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(colors::SECONDARY)),
        Span::styled(value, Style::default().fg(colors::PRIMARY)),
    ])
}

/// Lines shown when there is no snapshot to display
fn missing_data_lines(session: &RefreshSession) -> Vec<Line<'static>> {
    if let Some(ref error) = session.error {
        let mut lines = vec![Line::from(Span::styled(
            format!("ERROR: {}", error),
            Style::default().fg(colors::FAIL),
        ))];
        if session.connection_status == ConnectionStatus::Offline {
            lines.push(Line::from(Span::styled(
                "Press r to retry",
                Style::default().fg(colors::SECONDARY),
            )));
        }
        lines
    } else if session.is_loading {
        vec![Line::from(Span::styled(
            "Acquiring weather data...",
            Style::default().fg(colors::SECONDARY),
        ))]
    } else {
        vec![Line::from(Span::styled(
            "Weather data unavailable",
            Style::default().fg(colors::UNKNOWN),
        ))]
    }
}

/// Builds the current-conditions lines
fn status_lines(session: &RefreshSession) -> Vec<Line<'static>> {
    let Some(ref weather) = session.weather_data else {
        return missing_data_lines(session);
    };

    let status_color = match weather.status {
        OperationalStatus::Operational => colors::OK,
        OperationalStatus::Offline => colors::FAIL,
    };
    let current = &weather.current;

    vec![
        label_line(
            "LOCATION",
            format!("{}, {}", weather.location.name, weather.location.country),
        ),
        Line::from(vec![
            Span::styled(format!("{:<12}", "STATUS"), Style::default().fg(colors::SECONDARY)),
            Span::styled(weather.status.as_str(), Style::default().fg(status_color)),
        ]),
        label_line(
            "CONDITION",
            format!(
                "{} [{}]",
                current.condition.to_uppercase(),
                condition_code(&current.condition)
            ),
        ),
        label_line("", current.description.clone()),
        Line::from(vec![
            Span::styled(format!("{:<12}", "TEMP"), Style::default().fg(colors::SECONDARY)),
            Span::styled(
                format!("{}°C", current.temperature),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" (feels {}°C)", current.feels_like),
                Style::default().fg(colors::SECONDARY),
            ),
        ]),
        label_line(
            "CAPTURED",
            format_timestamp(&weather.timestamp.with_timezone(&Local)),
        ),
    ]
}

fn render_status_panel(frame: &mut Frame, area: Rect, session: &RefreshSession) {
    let paragraph = Paragraph::new(status_lines(session))
        .block(panel(" WEATHER STATUS "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Builds the environmental readings lines
fn environment_lines(weather: Option<&WeatherSnapshot>) -> Vec<Line<'static>> {
    let Some(weather) = weather else {
        return vec![Line::from(Span::styled(
            "No readings",
            Style::default().fg(colors::UNKNOWN),
        ))];
    };
    let current = &weather.current;

    vec![
        label_line("HUMIDITY", format!("{}%", current.humidity)),
        label_line("PRESSURE", format!("{} hPa", current.pressure)),
        label_line("VISIBILITY", format!("{} km", current.visibility)),
        label_line(
            "WIND",
            format!(
                "{} km/h {} ({}°)",
                current.wind_speed,
                wind_compass(current.wind_direction),
                current.wind_direction
            ),
        ),
        label_line(
            "COORDS",
            format!(
                "{:.4}, {:.4}",
                weather.location.coordinates.lat, weather.location.coordinates.lon
            ),
        ),
    ]
}

fn render_environment_panel(frame: &mut Frame, area: Rect, weather: Option<&WeatherSnapshot>) {
    let paragraph = Paragraph::new(environment_lines(weather)).block(panel(" ENVIRONMENTAL DATA "));
    frame.render_widget(paragraph, area);
}

/// Renders the key hint footer for the current state
pub fn render_key_hints(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.state {
        AppState::Dashboard => format!(
            " [{}]  Tab: switch  r: refresh  /: search  ?: help  q: quit",
            app.section.title()
        ),
        AppState::Search => " Enter: search/choose  ↑/↓: select  Esc: close".to_string(),
    };
    let hints = Paragraph::new(text).style(Style::default().fg(colors::UNKNOWN));
    frame.render_widget(hints, area);
}
