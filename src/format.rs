//! Display helpers shared by the dashboard panels

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};

/// 16-point compass, clockwise from north
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Converts a meteorological wind direction in degrees to a compass point
pub fn wind_compass(degrees: u16) -> &'static str {
    let index = (f64::from(degrees) / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Short code for an upstream condition group, `WX-000` when unknown
pub fn condition_code(condition: &str) -> &'static str {
    match condition {
        "Clear" => "WX-001",
        "Clouds" => "WX-002",
        "Rain" => "WX-003",
        "Drizzle" => "WX-004",
        "Thunderstorm" => "WX-005",
        "Snow" => "WX-006",
        "Mist" => "WX-007",
        "Fog" => "WX-008",
        "Haze" => "WX-009",
        _ => "WX-000",
    }
}

/// Formats a timestamp as `MM/DD/YYYY HH:MM` (24-hour) in its own timezone
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    timestamp.format("%m/%d/%Y %H:%M").to_string()
}

/// Relative "last sync" text for the header
///
/// `NEVER` without a sync, seconds or minutes ago within the hour, otherwise the
/// local wall-clock time of the sync.
pub fn last_sync_text(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(updated) = last_updated else {
        return "NEVER".to_string();
    };

    let age = (now - updated).num_seconds().max(0);
    match age {
        0..=59 => format!("{}s AGO", age),
        60..=3599 => format!("{}m AGO", age / 60),
        _ => updated.with_timezone(&Local).format("%H:%M:%S").to_string(),
    }
}

/// How recent the displayed data is relative to a maximum age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than half the maximum age
    Live,
    /// Between half and the full maximum age
    Aging,
    /// Older than the maximum age, or never synced
    Stale,
}

impl Freshness {
    pub fn classify(
        last_updated: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        max_age: std::time::Duration,
    ) -> Self {
        let Some(updated) = last_updated else {
            return Freshness::Stale;
        };

        let age_ms = (now - updated).num_milliseconds().max(0) as u128;
        let max_ms = max_age.as_millis();
        if age_ms * 2 < max_ms {
            Freshness::Live
        } else if age_ms < max_ms {
            Freshness::Aging
        } else {
            Freshness::Stale
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Freshness::Live => "LIVE DATA",
            Freshness::Aging => "AGING DATA",
            Freshness::Stale => "STALE DATA",
        }
    }
}
