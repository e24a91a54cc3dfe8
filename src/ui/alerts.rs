//! Hazard alerts section

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::data::{DisasterAlert, Severity};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Low => Color::Blue,
        Severity::Medium => colors::WARN,
        Severity::High => Color::LightRed,
        Severity::Critical => colors::FAIL,
    }
}

/// One summary row per alert
fn alert_line(alert: &DisasterAlert, selected: bool) -> Line<'static> {
    let marker = if selected { "▶ " } else { "  " };
    let title_style = if selected {
        Style::default()
            .fg(colors::SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::PRIMARY)
    };

    Line::from(vec![
        Span::styled(marker, Style::default().fg(colors::SELECTED)),
        Span::styled(
            format!("{:<9}", alert.severity.label()),
            Style::default()
                .fg(severity_color(alert.severity))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<11}", alert.alert_type.label()),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(alert.title.clone(), title_style),
        Span::styled(
            format!("  {}", alert.timestamp.with_timezone(&Local).format("%H:%M")),
            Style::default().fg(colors::SECONDARY),
        ),
    ])
}

/// Full text of the highlighted alert
fn detail_lines(alert: &DisasterAlert) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            alert.title.clone(),
            Style::default()
                .fg(severity_color(alert.severity))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(alert.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            format!("ID: {}   LOCATION: {}", alert.id, alert.location),
            Style::default().fg(colors::SECONDARY),
        )),
    ]
}

/// Renders the alert list with the selected alert's details below it
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(7)])
        .split(area);

    let list_block = Block::default()
        .title(Span::styled(
            format!(" HAZARD ALERTS ({}) ", app.alerts.len()),
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);

    let lines: Vec<Line> = if app.alerts.is_empty() {
        vec![Line::from(Span::styled(
            "No active alerts",
            Style::default().fg(colors::OK),
        ))]
    } else {
        app.alerts
            .iter()
            .enumerate()
            .map(|(i, alert)| alert_line(alert, i == app.selected_alert))
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(list_block), chunks[0]);

    let detail_block = Block::default()
        .title(" DETAILS ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::UNKNOWN));
    let details = match app.alerts.get(app.selected_alert) {
        Some(alert) => detail_lines(alert),
        None => vec![Line::from(Span::styled(
            "Alerts are illustrative and not from a warning service",
            Style::default().fg(colors::UNKNOWN),
        ))],
    };
    frame.render_widget(
        Paragraph::new(details)
            .block(detail_block)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );
}
