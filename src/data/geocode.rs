//! Location search and reverse geocoding
//!
//! With an API key, queries go to the OpenWeatherMap geocoding API. Without one,
//! searches fall back to a small built-in catalog of major cities.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::weather::OPENWEATHER_BASE_URL;
use super::{Coordinates, LocationSuggestion};

/// Queries shorter than this return no suggestions
pub const MIN_QUERY_CHARS: usize = 2;

/// Maximum number of suggestions returned by a forward search
pub const MAX_SUGGESTIONS: usize = 5;

/// Built-in catalog: (name, region, country, lat, lon)
const KNOWN_LOCATIONS: [(&str, &str, &str, f64, f64); 10] = [
    ("New York", "New York", "United States", 40.7128, -74.006),
    ("London", "England", "United Kingdom", 51.5074, -0.1278),
    ("Tokyo", "Tokyo", "Japan", 35.6762, 139.6503),
    ("Paris", "Île-de-France", "France", 48.8566, 2.3522),
    ("Sydney", "New South Wales", "Australia", -33.8688, 151.2093),
    ("Toronto", "Ontario", "Canada", 43.6532, -79.3832),
    ("Berlin", "Berlin", "Germany", 52.52, 13.405),
    ("Mumbai", "Maharashtra", "India", 19.076, 72.8777),
    ("São Paulo", "São Paulo", "Brazil", -23.5505, -46.6333),
    ("Dubai", "Dubai", "United Arab Emirates", 25.2048, 55.2708),
];

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Geocoding API returned status {0}")]
    Status(u16),
}

/// Searches the built-in catalog by case-insensitive substring on name, region, or country
pub fn search_known_locations(query: &str) -> Vec<LocationSuggestion> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    KNOWN_LOCATIONS
        .iter()
        .filter(|(name, region, country, _, _)| {
            name.to_lowercase().contains(&needle)
                || region.to_lowercase().contains(&needle)
                || country.to_lowercase().contains(&needle)
        })
        .take(MAX_SUGGESTIONS)
        .map(|&(name, region, country, lat, lon)| {
            LocationSuggestion::new(name, region, country, Coordinates::new(lat, lon))
        })
        .collect()
}

/// One entry of the OpenWeatherMap geocoding response
#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
}

impl GeoEntry {
    fn into_suggestion(self) -> LocationSuggestion {
        LocationSuggestion::new(
            &self.name,
            self.state.as_deref().unwrap_or(""),
            &self.country,
            Coordinates::new(self.lat, self.lon),
        )
    }
}

/// Client for forward and reverse geocoding
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: OPENWEATHER_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns ranked candidates for a partial location name
    ///
    /// Short queries yield an empty list. Without an API key the built-in
    /// catalog is searched instead.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, GeocodeError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(search_known_locations(query));
        };

        let limit = MAX_SUGGESTIONS.to_string();
        let entries: Vec<GeoEntry> = self
            .get("/geo/1.0/direct", &[("q", query), ("limit", limit.as_str()), ("appid", api_key)])
            .await?;

        tracing::debug!(query, results = entries.len(), "geocoding search");
        Ok(entries
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(GeoEntry::into_suggestion)
            .collect())
    }

    /// Resolves coordinates to the nearest named place
    ///
    /// Returns `Ok(None)` when no key is configured or nothing is found.
    pub async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<LocationSuggestion>, GeocodeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();
        let entries: Vec<GeoEntry> = self
            .get(
                "/geo/1.0/reverse",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("limit", "1"),
                    ("appid", api_key),
                ],
            )
            .await?;

        Ok(entries.into_iter().next().map(GeoEntry::into_suggestion))
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<GeoEntry>, GeocodeError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_short_query_returns_nothing() {
        assert!(search_known_locations("").is_empty());
        assert!(search_known_locations("t").is_empty());
        assert!(search_known_locations("  p ").is_empty());
    }

    #[test]
    fn test_search_matches_name_region_and_country() {
        let by_name = search_known_locations("tok");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Tokyo");

        let by_region = search_known_locations("ontario");
        assert_eq!(by_region[0].name, "Toronto");

        let by_country = search_known_locations("INDIA");
        assert_eq!(by_country[0].name, "Mumbai");
        assert_eq!(by_country[0].display_name, "Mumbai, Maharashtra, India");
    }

    #[test]
    fn test_search_is_capped_at_five() {
        let results = search_known_locations("an");
        assert!(results.len() <= MAX_SUGGESTIONS);
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_search_without_key_uses_catalog() {
        let client = GeocodeClient::new(None);
        let results = client.search("dub").await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].coordinates.lat - 25.2048).abs() < 0.0001);
    }

    #[tokio::test]
    async fn test_forward_search_with_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Springfield"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Springfield", "lat": 39.7817, "lon": -89.6501, "country": "US", "state": "Illinois"},
                {"name": "Springfield", "lat": 37.2090, "lon": -93.2923, "country": "US", "state": "Missouri"}
            ])))
            .mount(&server)
            .await;

        let client = GeocodeClient::new(Some("k".to_string())).with_base_url(server.uri());
        let results = client.search("Springfield").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name, "Springfield, Illinois, US");
        assert_eq!(results[1].region, "Missouri");
    }

    #[tokio::test]
    async fn test_reverse_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Shibuya", "lat": 35.6640, "lon": 139.6982, "country": "JP"}
            ])))
            .mount(&server)
            .await;

        let client = GeocodeClient::new(Some("k".to_string())).with_base_url(server.uri());
        let place = client
            .reverse(Coordinates::new(35.664, 139.698))
            .await
            .unwrap()
            .expect("should resolve a place");

        assert_eq!(place.name, "Shibuya");
        assert_eq!(place.display_name, "Shibuya, JP");
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = GeocodeClient::new(Some("bad".to_string())).with_base_url(server.uri());
        let result = client.search("London").await;

        assert!(matches!(result, Err(GeocodeError::Status(401))));
    }
}
