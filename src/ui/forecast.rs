//! Forecast panels: the 24-hour overview and the 7-day outlook

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::colors;
use super::widgets::TempSparkline;
use crate::app::App;
use crate::data::{DailyForecast, RawForecastSample};

/// Width of the day-name column in a forecast row
const DAY_COLUMN: usize = 10;

/// Width of the row-label column in the overview
const OVERVIEW_LABEL: u16 = 10;

/// Columns per sample in the overview
const OVERVIEW_CELL: u16 = 4;

/// Local hour label of a sample, e.g. `15:00`
fn sample_hour(sample: &RawForecastSample) -> String {
    DateTime::from_timestamp(sample.timestamp, 0)
        .map(|dt| dt.with_timezone(&Local).format("%H").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// `low..high` summary shown after an overview row
fn range_text(values: &[i32], unit: &str) -> String {
    match (values.iter().min(), values.iter().max()) {
        (Some(low), Some(high)) => format!(" {}{}..{}{}", low, unit, high, unit),
        _ => String::new(),
    }
}

/// Renders the next 24 hours: temperature and humidity trends over hour labels
pub fn render_overview(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(Span::styled(
            " 24H OVERVIEW ",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.overview.is_empty() {
        let message = if app.forecast_error.is_some() {
            "No hourly data"
        } else {
            "Loading forecast..."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(colors::SECONDARY))),
            inner,
        );
        return;
    }

    let temps: Vec<i32> = app.overview.iter().map(|s| s.temp.round() as i32).collect();
    let humidity: Vec<i32> = app.overview.iter().map(|s| i32::from(s.humidity)).collect();
    let hours: String = app
        .overview
        .iter()
        .map(|s| format!("{:<width$}", sample_hour(s), width = OVERVIEW_CELL as usize))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let trend_width = OVERVIEW_CELL * app.overview.len() as u16;

    let trends = [
        ("TEMP", &temps, "°", Style::default().fg(colors::WARN)),
        ("HUMIDITY", &humidity, "%", Style::default().fg(colors::HEADER)),
    ];
    for (row, (label, values, unit, style)) in rows.iter().zip(trends) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(OVERVIEW_LABEL),
                Constraint::Length(trend_width),
                Constraint::Min(0),
            ])
            .split(*row);

        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(colors::SECONDARY))),
            columns[0],
        );
        frame.render_widget(
            TempSparkline::new(values).cell_width(OVERVIEW_CELL).style(style),
            columns[1],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                range_text(values, unit),
                Style::default().fg(colors::PRIMARY),
            )),
            columns[2],
        );
    }

    let hour_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(OVERVIEW_LABEL), Constraint::Min(0)])
        .split(rows[2]);
    frame.render_widget(
        Paragraph::new(Span::styled("HOUR", Style::default().fg(colors::SECONDARY))),
        hour_columns[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(hours, Style::default().fg(colors::SECONDARY))),
        hour_columns[1],
    );
}

/// Builds one row of the outlook table
fn forecast_line(day: &DailyForecast) -> Line<'static> {
    let row_style = if day.projected {
        Style::default().fg(colors::PROJECTED)
    } else {
        Style::default().fg(colors::PRIMARY)
    };

    let mut spans = vec![
        Span::styled(
            format!("{:<width$}", day.day, width = DAY_COLUMN),
            row_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}  ", day.date.format("%m/%d")),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(format!("{:>3}°/{:<3}° ", day.temp_max, day.temp_min), row_style),
        Span::styled(format!("{:<14}", day.condition), row_style),
        Span::styled(
            format!("{:>3}%  {:>3} km/h", day.humidity, day.wind_speed),
            Style::default().fg(colors::SECONDARY),
        ),
    ];

    if day.projected {
        spans.push(Span::styled(
            "  (PROJ)",
            Style::default().fg(colors::PROJECTED),
        ));
    }

    Line::from(spans)
}

/// Renders the outlook: a high-temperature trend line above one row per day
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(Span::styled(
            " 7-DAY FORECAST ",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.forecast.is_empty() {
        let message = match app.forecast_error {
            Some(ref error) => Span::styled(
                format!("Forecast unavailable: {}", error),
                Style::default().fg(colors::FAIL),
            ),
            None => Span::styled("Loading forecast...", Style::default().fg(colors::SECONDARY)),
        };
        frame.render_widget(Paragraph::new(Line::from(message)), inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let highs: Vec<i32> = app.forecast.iter().map(|d| d.temp_max).collect();
    let mut sparkline = TempSparkline::new(&highs).cell_width(3);
    if let Some(first) = app.forecast.iter().position(|d| d.projected) {
        sparkline = sparkline.projected_from(first);
    }
    frame.render_widget(sparkline, rows[0]);

    let lines: Vec<Line> = app.forecast.iter().map(forecast_line).collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);
}
