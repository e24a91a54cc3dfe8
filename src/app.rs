//! Application state management for wxdash
//!
//! This module contains the dashboard state, keyboard handling, and the loaders
//! for the data that lives outside the refresh controller: the 7-day outlook,
//! the alert feed, and location search.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cache::CacheManager;
use crate::cli::StartupConfig;
use crate::data::{
    generate_alerts, DailyForecast, DisasterAlert, GeocodeClient, Location, LocationSuggestion,
    RawForecastSample, WeatherClient,
};
use crate::forecast;
use crate::format::Freshness;
use crate::refresh::{RefreshConfig, RefreshSession};

/// Number of upstream samples in the 24-hour overview (3-hourly)
pub const OVERVIEW_SAMPLES: usize = 8;

/// How often the alert feed is regenerated
pub const ALERT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Cache key of the last chosen location
const LAST_LOCATION_KEY: &str = "last_location";

/// The last location never expires in practice
const LAST_LOCATION_TTL_DAYS: i64 = 365;

/// Which screen has input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// The main dashboard
    Dashboard,
    /// Location search overlay
    Search,
}

/// Dashboard section shown in the lower half
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Weather,
    Alerts,
}

impl Section {
    fn toggle(self) -> Self {
        match self {
            Section::Weather => Section::Alerts,
            Section::Alerts => Section::Weather,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Weather => "WEATHER",
            Section::Alerts => "ALERTS",
        }
    }
}

/// Location search input and results
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub suggestions: Vec<LocationSuggestion>,
    pub selected: usize,
    /// Set after a search so an empty result can be told apart from no search yet
    pub searched: bool,
    pub error: Option<String>,
}

/// Main application struct managing state and data
pub struct App {
    pub state: AppState,
    pub section: Section,
    /// Currently subscribed location
    pub location: Location,
    /// Latest state published by the refresh controller
    pub session: RefreshSession,
    pub refresh_config: RefreshConfig,
    /// 7-day outlook for `location`
    pub forecast: Vec<DailyForecast>,
    /// The next 24 hours of raw samples, in upstream order
    pub overview: Vec<RawForecastSample>,
    pub forecast_error: Option<String>,
    pub alerts: Vec<DisasterAlert>,
    /// Index of the highlighted alert in the alerts section
    pub selected_alert: usize,
    alerts_generated_at: Option<Instant>,
    pub search: SearchState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a manual refresh has been requested
    pub refresh_requested: bool,
    /// Flag indicating a location search should be run
    pub search_requested: bool,
    /// A location chosen from search, waiting to be applied
    pub pending_location: Option<Location>,
    /// Flag to show help overlay
    pub show_help: bool,
    weather_client: WeatherClient,
    geocode_client: GeocodeClient,
    cache: Option<CacheManager>,
}

impl App {
    /// Creates the app from the startup configuration, using the platform cache
    pub fn new(config: &StartupConfig) -> Self {
        let cache = CacheManager::new();
        let mut weather_client = WeatherClient::new(config.api_key.clone());
        if let Some(ref cache) = cache {
            weather_client = weather_client.with_cache(cache.clone());
        }
        let geocode_client = GeocodeClient::new(config.api_key.clone());

        let mut app = Self::with_clients(weather_client, geocode_client, cache);
        app.refresh_config = config.refresh;
        app.location = config.location.clone();
        if !config.location_given {
            if let Some(location) = app.restore_last_location() {
                app.location = location;
            }
        }
        app
    }

    /// Creates an app with the given clients and cache, at the default location
    pub fn with_clients(
        weather_client: WeatherClient,
        geocode_client: GeocodeClient,
        cache: Option<CacheManager>,
    ) -> Self {
        let defaults = StartupConfig::default();
        Self {
            state: AppState::Dashboard,
            section: Section::Weather,
            location: defaults.location,
            session: RefreshSession {
                max_retries: defaults.refresh.max_retries,
                ..RefreshSession::default()
            },
            refresh_config: defaults.refresh,
            forecast: Vec::new(),
            overview: Vec::new(),
            forecast_error: None,
            alerts: Vec::new(),
            selected_alert: 0,
            alerts_generated_at: None,
            search: SearchState::default(),
            should_quit: false,
            refresh_requested: false,
            search_requested: false,
            pending_location: None,
            show_help: false,
            weather_client,
            geocode_client,
            cache,
        }
    }

    /// Client used for current conditions and the outlook
    pub fn weather_client(&self) -> &WeatherClient {
        &self.weather_client
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (dashboard)
    /// - `r`: Force refresh
    /// - `/`: Open location search
    /// - `Tab`: Switch between weather and alerts
    /// - `Up`/`k`, `Down`/`j`: Move through alerts or search results
    /// - `Enter` (search): Search, or choose the highlighted result
    /// - `Esc` (search): Close search
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match self.state {
            AppState::Dashboard => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('/') => {
                    self.open_search();
                }
                KeyCode::Tab => {
                    self.section = self.section.toggle();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_alert = self.selected_alert.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected_alert + 1 < self.alerts.len() {
                        self.selected_alert += 1;
                    }
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Search => match key_event.code {
                KeyCode::Esc => {
                    self.state = AppState::Dashboard;
                }
                KeyCode::Enter => {
                    if let Some(choice) = self.search.suggestions.get(self.search.selected) {
                        self.pending_location = Some(choice.to_location());
                        self.state = AppState::Dashboard;
                    } else {
                        self.search_requested = true;
                    }
                }
                KeyCode::Up => {
                    self.search.selected = self.search.selected.saturating_sub(1);
                }
                KeyCode::Down => {
                    if self.search.selected + 1 < self.search.suggestions.len() {
                        self.search.selected += 1;
                    }
                }
                KeyCode::Backspace => {
                    self.search.query.pop();
                    self.clear_results();
                }
                KeyCode::Char(c) => {
                    self.search.query.push(c);
                    self.clear_results();
                }
                _ => {}
            },
        }
    }

    fn open_search(&mut self) {
        self.search = SearchState::default();
        self.state = AppState::Search;
    }

    /// Editing the query invalidates the previous results
    fn clear_results(&mut self) {
        self.search.suggestions.clear();
        self.search.selected = 0;
        self.search.searched = false;
        self.search.error = None;
    }

    /// Runs the pending location search
    pub async fn run_search(&mut self) {
        self.search_requested = false;
        match self.geocode_client.search(&self.search.query).await {
            Ok(suggestions) => {
                self.search.suggestions = suggestions;
                self.search.error = None;
            }
            Err(e) => {
                tracing::warn!(query = %self.search.query, error = %e, "location search failed");
                self.search.suggestions.clear();
                self.search.error = Some(e.to_string());
            }
        }
        self.search.selected = 0;
        self.search.searched = true;
    }

    /// Takes the latest controller state
    pub fn sync_session(&mut self, session: RefreshSession) {
        self.session = session;
    }

    /// Switches to `location`, remembering it for the next start
    ///
    /// Clears the outlook and alerts that belonged to the previous location.
    pub fn set_location(&mut self, location: Location) {
        tracing::info!(location = %location.name, "switching location");
        self.location = location;
        self.forecast.clear();
        self.overview.clear();
        self.forecast_error = None;
        self.alerts.clear();
        self.selected_alert = 0;
        self.alerts_generated_at = None;
        self.save_last_location();
    }

    /// Replaces a coordinate placeholder name with the nearest place name
    ///
    /// Leaves the location untouched when it already has a name or the lookup
    /// finds nothing.
    pub async fn resolve_place_name(&mut self) {
        let Some(coordinates) = self.location.coordinates else {
            return;
        };
        if !self.location.is_unnamed() {
            return;
        }

        match self.geocode_client.reverse(coordinates).await {
            Ok(Some(place)) => {
                tracing::info!(name = %place.display_name, "resolved coordinates");
                self.location.name = place.name;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "reverse geocoding failed"),
        }
    }

    /// Fetches the forecast for the current location, keeping the 24-hour
    /// overview and aggregating the 7-day outlook
    pub async fn load_forecast(&mut self) {
        let query = self.location.fetch_query();
        let result = match self.weather_client.fetch_forecast(&query).await {
            Ok(samples) => forecast::aggregate(&samples)
                .map(|days| {
                    let overview = samples.iter().take(OVERVIEW_SAMPLES).cloned().collect();
                    (days, overview)
                })
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok((days, overview)) => {
                self.forecast = days;
                self.overview = overview;
                self.forecast_error = None;
            }
            Err(message) => {
                tracing::warn!(%query, error = %message, "forecast unavailable");
                self.forecast.clear();
                self.overview.clear();
                self.forecast_error = Some(message);
            }
        }
    }

    /// Whether the alert feed is due for regeneration
    pub fn alerts_due(&self, now: Instant) -> bool {
        match self.alerts_generated_at {
            None => true,
            Some(at) => now.duration_since(at) >= ALERT_REFRESH_INTERVAL,
        }
    }

    /// Regenerates the alert feed for the current location
    pub fn refresh_alerts(&mut self, now: Instant) {
        self.alerts = generate_alerts(&self.location.name, Utc::now(), &mut rand::thread_rng())
            .into_iter()
            .filter(|alert| alert.is_active)
            .collect();
        self.selected_alert = self
            .selected_alert
            .min(self.alerts.len().saturating_sub(1));
        self.alerts_generated_at = Some(now);
    }

    /// How recent the displayed conditions are
    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        Freshness::classify(
            self.session.last_updated,
            now,
            self.refresh_config.refresh_interval,
        )
    }

    fn save_last_location(&self) {
        let Some(ref cache) = self.cache else {
            return;
        };
        if let Err(e) = cache.write(
            LAST_LOCATION_KEY,
            &self.location,
            chrono::Duration::days(LAST_LOCATION_TTL_DAYS),
        ) {
            tracing::warn!(error = %e, "failed to save last location");
        }
    }

    fn restore_last_location(&self) -> Option<Location> {
        let cached = self.cache.as_ref()?.read::<Location>(LAST_LOCATION_KEY)?;
        tracing::debug!(location = %cached.data.name, "restored last location");
        Some(cached.data)
    }
}
