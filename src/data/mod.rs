//! Core data models for wxdash
//!
//! This module contains the types shared by the upstream clients, the refresh
//! controller, the forecast aggregator, and the dashboard: locations, current
//! conditions snapshots, raw and daily forecasts, and location suggestions.

pub mod alerts;
pub mod geocode;
pub mod weather;

pub use alerts::{generate_alerts, AlertType, DisasterAlert, Severity};
pub use geocode::{search_known_locations, GeocodeClient, GeocodeError};
pub use weather::{WeatherClient, WeatherError, WeatherSource};

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Display name for a location known only by its coordinates
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// How an upstream lookup addresses a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    /// Name-based lookup (e.g. "Bengaluru")
    Name(String),
    /// Coordinate-based lookup
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Returns a filesystem-safe key identifying this query, used for cache entries
    pub fn cache_key(&self) -> String {
        match self {
            LocationQuery::Name(name) => {
                let slug: String = name
                    .trim()
                    .to_lowercase()
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect();
                format!("name_{}", slug)
            }
            LocationQuery::Coordinates(c) => format!("coord_{:.4}_{:.4}", c.lat, c.lon)
                .replace('-', "m")
                .replace('.', "_"),
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Name(name) => write!(f, "{}", name),
            LocationQuery::Coordinates(c) => write!(f, "{:.4},{:.4}", c.lat, c.lon),
        }
    }
}

/// A subscribed location: the display name plus optional coordinates
///
/// When coordinates are present they take precedence for upstream lookups;
/// the name is then only used for display and for the alert feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates: Some(coordinates),
        }
    }

    /// True when the name is only a placeholder for the coordinates
    pub fn is_unnamed(&self) -> bool {
        self.coordinates
            .map(|c| c.label() == self.name)
            .unwrap_or(false)
    }

    /// Builds the upstream query: coordinates if present, otherwise the name
    pub fn fetch_query(&self) -> LocationQuery {
        match self.coordinates {
            Some(coordinates) => LocationQuery::Coordinates(coordinates),
            None => LocationQuery::Name(self.name.clone()),
        }
    }
}

/// Operational status tag carried by every snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationalStatus {
    Operational,
    Offline,
}

impl OperationalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Operational => "OPERATIONAL",
            OperationalStatus::Offline => "OFFLINE",
        }
    }
}

/// Where a snapshot was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLocation {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

/// Current conditions, already converted to display units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in whole degrees Celsius
    pub temperature: i32,
    /// Feels-like temperature in whole degrees Celsius
    pub feels_like: i32,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: u32,
    /// Visibility in km
    pub visibility: u32,
    /// Wind speed in km/h
    pub wind_speed: u32,
    /// Wind direction in degrees (meteorological)
    pub wind_direction: u16,
    /// Condition group (e.g. "Clouds")
    pub condition: String,
    /// Free-text description (e.g. "scattered clouds")
    pub description: String,
    /// Upstream icon reference (e.g. "03d")
    pub icon: String,
}

/// A complete current-conditions record, replaced wholesale on each successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: SnapshotLocation,
    pub current: CurrentConditions,
    /// When this snapshot was captured
    pub timestamp: DateTime<Utc>,
    pub status: OperationalStatus,
}

/// One upstream forecast entry (typically 3-hourly)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastSample {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Minimum temperature in Celsius
    pub temp_min: f64,
    /// Maximum temperature in Celsius
    pub temp_max: f64,
    /// Average temperature in Celsius
    pub temp: f64,
    /// Condition group (e.g. "Rain")
    pub condition: String,
    /// Upstream icon reference
    pub icon: String,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Wind speed in m/s, as delivered upstream
    pub wind_speed: f64,
}

/// One calendar day of the 7-day outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Upper-case English weekday name (e.g. "SATURDAY")
    pub day: String,
    pub temp_max: i32,
    pub temp_min: i32,
    /// Upper-case condition group (e.g. "CLOUDS")
    pub condition: String,
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_speed: u32,
    pub icon: String,
    /// True when this day was extrapolated rather than backed by upstream samples
    pub projected: bool,
}

/// A ranked location candidate returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub region: String,
    pub country: String,
    pub display_name: String,
    pub coordinates: Coordinates,
}

impl LocationSuggestion {
    pub fn new(name: &str, region: &str, country: &str, coordinates: Coordinates) -> Self {
        let display_name = [name, region, country]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: name.to_string(),
            region: region.to_string(),
            country: country.to_string(),
            display_name,
            coordinates,
        }
    }

    /// Converts the suggestion into a subscribable location
    pub fn to_location(&self) -> Location {
        Location::with_coordinates(self.name.clone(), self.coordinates)
    }
}
