//! OpenWeatherMap client
//!
//! Fetches current conditions and the 5-day/3-hour forecast, converting the
//! upstream payloads into `WeatherSnapshot` and `RawForecastSample` values.

use chrono::{TimeZone, Utc};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::{
    Coordinates, CurrentConditions, LocationQuery, OperationalStatus, RawForecastSample,
    SnapshotLocation, WeatherSnapshot,
};
use crate::cache::CacheManager;

/// Base URL for the OpenWeatherMap API
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// How long a cached forecast stays fresh, in minutes
const FORECAST_CACHE_TTL_MINUTES: i64 = 60;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key was configured
    #[error("Weather API key not configured")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with an error payload
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Timestamp outside the representable range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Anything that can produce a current-conditions snapshot for a location
///
/// The refresh controller is generic over this so tests can script outcomes.
pub trait WeatherSource: Send + Sync + 'static {
    fn current<'a>(
        &'a self,
        query: &'a LocationQuery,
    ) -> BoxFuture<'a, Result<WeatherSnapshot, WeatherError>>;
}

/// Client for the OpenWeatherMap current-weather and forecast endpoints
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    cache: Option<CacheManager>,
}

impl WeatherClient {
    /// Create a new WeatherClient against the public API
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            cache: None,
        }
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Point the client at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable forecast caching
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current conditions for the given location
    ///
    /// # Returns
    /// * `Ok(WeatherSnapshot)` - Snapshot tagged `OPERATIONAL`
    /// * `Err(WeatherError)` - If the key is missing, the request fails, or the payload is malformed
    pub async fn fetch_weather(&self, query: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        let response: OwmCurrentResponse = self.get_json("/data/2.5/weather", query).await?;
        parse_current(response)
    }

    /// Fetch the raw 3-hourly forecast list for the given location
    ///
    /// Fresh cached samples are returned without a request. If the request fails,
    /// expired cached samples are returned instead of the error when available.
    pub async fn fetch_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<Vec<RawForecastSample>, WeatherError> {
        let cache_key = format!("forecast_{}", query.cache_key());

        if let Some(ref cache) = self.cache {
            if let Some(cached) = cache.read::<Vec<RawForecastSample>>(&cache_key) {
                if !cached.is_expired {
                    tracing::debug!(%query, "forecast served from cache");
                    return Ok(cached.data);
                }
            }
        }

        let result = self
            .get_json::<OwmForecastResponse>("/data/2.5/forecast", query)
            .await
            .and_then(parse_forecast);

        match result {
            Ok(samples) => {
                if let Some(ref cache) = self.cache {
                    if let Err(e) = cache.write(
                        &cache_key,
                        &samples,
                        chrono::Duration::minutes(FORECAST_CACHE_TTL_MINUTES),
                    ) {
                        tracing::warn!(error = %e, "failed to cache forecast");
                    }
                }
                Ok(samples)
            }
            Err(e) => {
                if let Some(ref cache) = self.cache {
                    if let Some(cached) = cache.read::<Vec<RawForecastSample>>(&cache_key) {
                        tracing::warn!(%query, error = %e, "forecast fetch failed, using stale cache");
                        return Ok(cached.data);
                    }
                }
                Err(e)
            }
        }
    }

    /// Issue a GET against `path` with location addressing and decode the body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &LocationQuery,
    ) -> Result<T, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::Name(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        };
        params.push(("appid", api_key.to_string()));
        params.push(("units", "metric".to_string()));

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, %query, "requesting weather data");

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorPayload>(&text)
                .ok()
                .and_then(|payload| payload.message)
                .unwrap_or_else(|| "Failed to fetch weather data".to_string());
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl WeatherSource for WeatherClient {
    fn current<'a>(
        &'a self,
        query: &'a LocationQuery,
    ) -> BoxFuture<'a, Result<WeatherSnapshot, WeatherError>> {
        self.fetch_weather(query).boxed()
    }
}

/// Convert a current-weather payload into a snapshot
fn parse_current(response: OwmCurrentResponse) -> Result<WeatherSnapshot, WeatherError> {
    let condition = response
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MissingField("weather".to_string()))?;

    Ok(WeatherSnapshot {
        location: SnapshotLocation {
            name: response.name,
            country: response.sys.country.unwrap_or_default(),
            coordinates: Coordinates::new(response.coord.lat, response.coord.lon),
        },
        current: CurrentConditions {
            temperature: response.main.temp.round() as i32,
            feels_like: response.main.feels_like.round() as i32,
            humidity: response.main.humidity.clamp(0.0, 100.0) as u8,
            pressure: response.main.pressure.max(0.0).round() as u32,
            visibility: (response.visibility.unwrap_or(0.0) / 1000.0).round().max(0.0) as u32,
            wind_speed: ms_to_kmh(response.wind.speed),
            wind_direction: response.wind.deg.unwrap_or(0.0).rem_euclid(360.0) as u16,
            condition: condition.main,
            description: condition.description,
            icon: condition.icon,
        },
        timestamp: Utc::now(),
        status: OperationalStatus::Operational,
    })
}

/// Convert a forecast payload into raw samples, preserving upstream order
fn parse_forecast(response: OwmForecastResponse) -> Result<Vec<RawForecastSample>, WeatherError> {
    response
        .list
        .into_iter()
        .map(|entry| {
            if Utc.timestamp_opt(entry.dt, 0).single().is_none() {
                return Err(WeatherError::InvalidTimestamp(entry.dt));
            }
            let condition = entry
                .weather
                .into_iter()
                .next()
                .ok_or_else(|| WeatherError::MissingField(format!("weather for dt {}", entry.dt)))?;
            Ok(RawForecastSample {
                timestamp: entry.dt,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                temp: entry.main.temp,
                condition: condition.main,
                icon: condition.icon,
                humidity: entry.main.humidity.clamp(0.0, 100.0) as u8,
                wind_speed: entry.wind.speed,
            })
        })
        .collect()
}

/// Convert m/s to whole km/h
pub fn ms_to_kmh(speed: f64) -> u32 {
    (speed * 3.6).round().max(0.0) as u32
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    name: String,
    coord: OwmCoord,
    sys: OwmSys,
    main: OwmMain,
    visibility: Option<f64>,
    wind: OwmWind,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastEntry {
    dt: i64,
    main: OwmMain,
    wind: OwmWind,
    weather: Vec<OwmCondition>,
}
