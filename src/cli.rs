//! Command-line interface parsing for wxdash
//!
//! Parses the startup location, API key, and refresh cadence with clap and
//! validates them into a `StartupConfig`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{Coordinates, Location};
use crate::refresh::RefreshConfig;

/// Location shown when none is given
pub const DEFAULT_LOCATION: &str = "Bengaluru";

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    /// Only one half of a coordinate pair was given
    #[error("--lat and --lon must be given together")]
    IncompleteCoordinates,

    #[error("Invalid latitude: {0} (expected -90 to 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (expected -180 to 180)")]
    InvalidLongitude(f64),

    #[error("Refresh interval must be at least 1 second")]
    ZeroRefreshInterval,

    #[error("Location name must not be empty")]
    EmptyLocation,
}

/// wxdash - live weather and hazard dashboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "wxdash")]
#[command(about = "Live weather, 7-day outlook, and hazard alerts for any location")]
#[command(version)]
pub struct Cli {
    /// Location name to show on startup [default: last used, else Bengaluru]
    ///
    /// Examples:
    ///   wxdash --location Tokyo
    ///   wxdash --location Sydney --lat -33.8688 --lon 151.2093
    #[arg(long, short = 'l', value_name = "NAME")]
    pub location: Option<String>,

    /// Latitude for coordinate-based lookup (requires --lon)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for coordinate-based lookup (requires --lat)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds between automatic refreshes
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub refresh_secs: u64,

    /// Retries after a failed fetch before going offline
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_retries: u32,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub location: Location,
    /// False when the location is the built-in default and may be replaced by the last used one
    pub location_given: bool,
    pub refresh: RefreshConfig,
    pub api_key: Option<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            location: Location::named(DEFAULT_LOCATION),
            location_given: false,
            refresh: RefreshConfig::default(),
            api_key: None,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the validated settings
    /// * `Err(CliError)` if the location or cadence is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let name = cli.location.as_deref().map(str::trim);
        if name == Some("") {
            return Err(CliError::EmptyLocation);
        }

        let location = match (cli.lat, cli.lon) {
            (None, None) => Location::named(name.unwrap_or(DEFAULT_LOCATION)),
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(CliError::InvalidLatitude(lat));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(CliError::InvalidLongitude(lon));
                }
                let coordinates = Coordinates::new(lat, lon);
                // Unnamed coordinates are labelled until a place name is looked up
                let name = name.map(str::to_string).unwrap_or_else(|| coordinates.label());
                Location::with_coordinates(name, coordinates)
            }
            _ => return Err(CliError::IncompleteCoordinates),
        };

        if cli.refresh_secs == 0 {
            return Err(CliError::ZeroRefreshInterval);
        }

        Ok(StartupConfig {
            location_given: cli.location.is_some() || cli.lat.is_some(),
            location,
            refresh: RefreshConfig {
                refresh_interval: Duration::from_secs(cli.refresh_secs),
                max_retries: cli.max_retries,
            },
            api_key: cli.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["wxdash"]);
        assert!(cli.location.is_none());
        assert!(cli.lat.is_none());
        assert!(cli.lon.is_none());
        assert_eq!(cli.refresh_secs, 300);
        assert_eq!(cli.max_retries, 3);
    }

    #[test]
    fn test_coordinates_without_name_are_unnamed() {
        let cli = Cli::parse_from(["wxdash", "--lat", "35.6762", "--lon", "139.6503"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.location.name, "35.6762, 139.6503");
        assert!(config.location.is_unnamed());
        assert!(config.location_given);
    }

    #[test]
    fn test_startup_config_from_defaults() {
        let cli = Cli::parse_from(["wxdash"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.location, Location::named("Bengaluru"));
        assert!(!config.location_given);
        assert_eq!(config.refresh, RefreshConfig::default());
    }

    #[test]
    fn test_startup_config_with_coordinates() {
        let cli = Cli::parse_from([
            "wxdash",
            "--location",
            "Sydney",
            "--lat",
            "-33.8688",
            "--lon",
            "151.2093",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.location,
            Location::with_coordinates("Sydney", Coordinates::new(-33.8688, 151.2093))
        );
        assert!(config.location_given);
    }

    #[test]
    fn test_startup_config_custom_cadence() {
        let cli = Cli::parse_from(["wxdash", "--refresh-secs", "60", "--max-retries", "5"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.refresh.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.refresh.max_retries, 5);
    }

    #[test]
    fn test_lat_without_lon_is_rejected() {
        let cli = Cli::parse_from(["wxdash", "--lat", "10.0"]);
        assert_eq!(
            StartupConfig::from_cli(&cli),
            Err(CliError::IncompleteCoordinates)
        );
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let cli = Cli::parse_from(["wxdash", "--lat", "91", "--lon", "0"]);
        assert_eq!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidLatitude(91.0))
        );

        let cli = Cli::parse_from(["wxdash", "--lat", "0", "--lon", "-181"]);
        assert_eq!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidLongitude(-181.0))
        );
    }

    #[test]
    fn test_zero_refresh_interval_is_rejected() {
        let cli = Cli::parse_from(["wxdash", "--refresh-secs", "0"]);
        assert_eq!(
            StartupConfig::from_cli(&cli),
            Err(CliError::ZeroRefreshInterval)
        );
    }

    #[test]
    fn test_blank_location_is_rejected() {
        let cli = Cli::parse_from(["wxdash", "--location", "  "]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let cli = Cli::parse_from(["wxdash", "--api-key", "  "]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.api_key.is_none());
    }
}
