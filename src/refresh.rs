//! Background refresh controller
//!
//! Keeps one location's current conditions up to date. Each subscription runs
//! on its own tokio task that owns a single timer slot (periodic refresh or
//! retry backoff), the in-flight fetches, and the published `RefreshSession`.
//! The UI talks to the task through a `RefreshHandle`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::data::{Location, WeatherError, WeatherSnapshot, WeatherSource};

/// Base delay for the first retry; doubles on each subsequent failure
const BACKOFF_BASE_MS: u64 = 1000;

/// Connection health as shown in the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The last fetch succeeded, or one is under way
    #[default]
    Online,
    /// The last fetch failed and a retry is scheduled or running
    Reconnecting,
    /// Retries are exhausted; waits for a manual refresh or a new location
    Offline,
}

impl ConnectionStatus {
    /// Header text, e.g. `RECONNECTING (2/3)`
    pub fn label(&self, retry_count: u32, max_retries: u32) -> String {
        match self {
            ConnectionStatus::Online => "ONLINE".to_string(),
            ConnectionStatus::Reconnecting => {
                format!("RECONNECTING ({}/{})", retry_count, max_retries)
            }
            ConnectionStatus::Offline => "OFFLINE".to_string(),
        }
    }
}

/// What the UI sees of a subscription
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSession {
    /// Latest snapshot; cleared on every failed fetch
    pub weather_data: Option<WeatherSnapshot>,
    /// True while the most recently issued fetch is outstanding
    pub is_loading: bool,
    /// Message of the last failure, cleared on success
    pub error: Option<String>,
    /// Wall-clock time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
    pub connection_status: ConnectionStatus,
    /// Consecutive failures since the last success, reset, or location change
    pub retry_count: u32,
    pub max_retries: u32,
}

impl RefreshSession {
    pub fn status_label(&self) -> String {
        self.connection_status
            .label(self.retry_count, self.max_retries)
    }
}

/// Configuration for a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Interval between automatic refreshes after a success
    pub refresh_interval: Duration,
    /// Retries allowed after the initial attempt before going offline
    pub max_retries: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(300), // 5 minutes
            max_retries: 3,
        }
    }
}

/// Delay before the retry following the `retry_count`-th consecutive failure
///
/// `retry_count` is the count before it is incremented: 0 gives 1s, 1 gives 2s,
/// 2 gives 4s.
pub fn backoff_delay(retry_count: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(2u64.saturating_pow(retry_count)))
}

/// Requests sent from the handle to the controller task
#[derive(Debug)]
enum Command {
    ForceRefresh,
    SetLocation(Location),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Periodic,
    Backoff,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    deadline: Instant,
}

/// A finished fetch, tagged with the sequence number it was issued under
type Completion = (u64, Result<WeatherSnapshot, WeatherError>);

type InFlight = FuturesUnordered<BoxFuture<'static, Completion>>;

/// Sending side of the session, shared between the task and the handle
///
/// Closing takes the sender under the lock, so no update can land once
/// `close` has returned, even while the task is mid-poll on another thread.
#[derive(Clone)]
struct Publisher(Arc<Mutex<Option<watch::Sender<RefreshSession>>>>);

impl Publisher {
    fn new(sender: watch::Sender<RefreshSession>) -> Self {
        Self(Arc::new(Mutex::new(Some(sender))))
    }

    fn modify(&self, update: impl FnOnce(&mut RefreshSession)) {
        let guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = guard.as_ref() {
            sender.send_modify(update);
        }
    }

    fn read<T>(&self, field: impl FnOnce(&RefreshSession) -> T) -> Option<T> {
        let guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|sender| field(&sender.borrow()))
    }

    fn close(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn is_closed(&self) -> bool {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).is_none()
    }
}

/// Task-side state of one subscription
struct Controller<S> {
    source: Arc<S>,
    location: Location,
    config: RefreshConfig,
    /// At most one pending timer; assigning replaces the previous one
    timer: Option<Timer>,
    /// Sequence number of the most recently issued fetch
    issued: u64,
    session: Publisher,
}

impl<S: WeatherSource> Controller<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut in_flight = InFlight::new();
        self.issue(&mut in_flight);

        loop {
            let deadline = self.timer.map(|timer| timer.deadline);
            let timer = async move {
                match deadline {
                    Some(at) => time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::ForceRefresh) => self.force_refresh(&mut in_flight),
                    Some(Command::SetLocation(location)) => {
                        self.change_location(location, &mut in_flight)
                    }
                    None => break,
                },
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(seq, result);
                }
                _ = timer => self.fire_timer(&mut in_flight),
            }
        }

        tracing::debug!(location = %self.location.name, "refresh controller stopped");
    }

    fn issue(&mut self, in_flight: &mut InFlight) {
        self.issued += 1;
        let seq = self.issued;
        let source = Arc::clone(&self.source);
        let query = self.location.fetch_query();

        tracing::debug!(seq, %query, "fetching current conditions");
        in_flight.push(
            async move {
                let result = source.current(&query).await;
                (seq, result)
            }
            .boxed(),
        );
        self.session.modify(|s| s.is_loading = true);
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.timer = Some(Timer {
            kind,
            deadline: Instant::now() + delay,
        });
    }

    fn fire_timer(&mut self, in_flight: &mut InFlight) {
        let Some(timer) = self.timer.take() else {
            return;
        };

        match timer.kind {
            TimerKind::Periodic => {
                if self.session.read(|s| s.connection_status) == Some(ConnectionStatus::Offline) {
                    return;
                }
                self.timer = Some(Timer {
                    kind: TimerKind::Periodic,
                    deadline: timer.deadline + self.config.refresh_interval,
                });
                self.issue(in_flight);
            }
            TimerKind::Backoff => self.issue(in_flight),
        }
    }

    fn complete(&mut self, seq: u64, result: Result<WeatherSnapshot, WeatherError>) {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "discarding superseded response");
            return;
        }

        match result {
            Ok(snapshot) => {
                self.session.modify(|s| {
                    s.weather_data = Some(snapshot);
                    s.last_updated = Some(Utc::now());
                    s.connection_status = ConnectionStatus::Online;
                    s.retry_count = 0;
                    s.error = None;
                    s.is_loading = false;
                });
                let periodic_pending =
                    matches!(self.timer, Some(t) if t.kind == TimerKind::Periodic);
                if !periodic_pending {
                    self.arm(TimerKind::Periodic, self.config.refresh_interval);
                }
            }
            Err(err) => {
                let message = err.to_string();
                let retry_count = self.session.read(|s| s.retry_count).unwrap_or_default();

                if retry_count < self.config.max_retries {
                    let delay = backoff_delay(retry_count);
                    tracing::warn!(
                        error = %message,
                        attempt = retry_count + 1,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed, retrying"
                    );
                    self.arm(TimerKind::Backoff, delay);
                    self.session.modify(|s| {
                        s.error = Some(message);
                        s.weather_data = None;
                        s.connection_status = ConnectionStatus::Reconnecting;
                        s.retry_count = retry_count + 1;
                        s.is_loading = false;
                    });
                } else {
                    tracing::error!(error = %message, "retries exhausted, going offline");
                    self.timer = None;
                    self.session.modify(|s| {
                        s.error = Some(message);
                        s.weather_data = None;
                        s.connection_status = ConnectionStatus::Offline;
                        s.is_loading = false;
                    });
                }
            }
        }
    }

    fn force_refresh(&mut self, in_flight: &mut InFlight) {
        tracing::info!(location = %self.location.name, "manual refresh");
        self.timer = None;
        self.session.modify(|s| {
            s.retry_count = 0;
            s.connection_status = ConnectionStatus::Online;
            s.error = None;
        });
        self.issue(in_flight);
    }

    fn change_location(&mut self, location: Location, in_flight: &mut InFlight) {
        tracing::info!(from = %self.location.name, to = %location.name, "location changed");
        self.location = location;
        self.timer = None;
        self.session.modify(|s| {
            s.retry_count = 0;
            s.connection_status = ConnectionStatus::Online;
            s.error = None;
        });
        self.issue(in_flight);
    }
}

/// Starts keeping `location` fresh, fetching immediately
///
/// Must be called from within a tokio runtime. The subscription lives until the
/// returned handle is disposed or dropped.
pub fn subscribe<S: WeatherSource>(
    source: Arc<S>,
    location: Location,
    config: RefreshConfig,
) -> RefreshHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (session_tx, session_rx) = watch::channel(RefreshSession {
        max_retries: config.max_retries,
        ..RefreshSession::default()
    });

    tracing::info!(
        location = %location.name,
        interval_secs = config.refresh_interval.as_secs(),
        max_retries = config.max_retries,
        "subscribing"
    );

    let publisher = Publisher::new(session_tx);
    let controller = Controller {
        source,
        location,
        config,
        timer: None,
        issued: 0,
        session: publisher.clone(),
    };
    let task = tokio::spawn(controller.run(command_rx));

    RefreshHandle {
        commands: command_tx,
        session: session_rx,
        publisher,
        task,
    }
}

/// Handle for controlling a subscription
///
/// Dropping the handle tears the subscription down.
pub struct RefreshHandle {
    commands: mpsc::UnboundedSender<Command>,
    session: watch::Receiver<RefreshSession>,
    publisher: Publisher,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Latest published state
    pub fn session(&self) -> RefreshSession {
        self.session.borrow().clone()
    }

    /// A receiver that is notified on every state change
    pub fn updates(&self) -> watch::Receiver<RefreshSession> {
        self.session.clone()
    }

    /// Resets the retry count and fetches immediately, whatever the current status
    pub fn force_refresh(&self) {
        let _ = self.commands.send(Command::ForceRefresh);
    }

    /// Switches to `location`, cancelling pending timers and resetting retries
    pub fn set_location(&self, location: Location) {
        let _ = self.commands.send(Command::SetLocation(location));
    }

    /// Cancels the controller task along with any pending timer or fetch
    ///
    /// Nothing is published after this returns.
    pub fn dispose(&self) {
        self.publisher.close();
        self.task.abort();
    }

    /// Whether the subscription has been disposed or its task has stopped
    pub fn is_disposed(&self) -> bool {
        self.publisher.is_closed() || self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        Coordinates, CurrentConditions, LocationQuery, OperationalStatus, SnapshotLocation,
    };
    use std::collections::VecDeque;

    /// One scripted upstream answer
    struct Step {
        delay: Duration,
        /// Ok carries the temperature to report
        outcome: Result<i32, &'static str>,
    }

    fn ok(temperature: i32) -> Step {
        Step {
            delay: Duration::ZERO,
            outcome: Ok(temperature),
        }
    }

    fn fail() -> Step {
        Step {
            delay: Duration::ZERO,
            outcome: Err("upstream unavailable"),
        }
    }

    fn slow(step: Step, delay: Duration) -> Step {
        Step { delay, ..step }
    }

    /// Weather source that replays a script and records when it was called
    struct ScriptedSource {
        start: Instant,
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<(Duration, LocationQuery)>>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                start: Instant::now(),
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_times_ms(&self) -> Vec<u128> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(at, _)| at.as_millis())
                .collect()
        }

        fn queries(&self) -> Vec<LocationQuery> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, q)| q.clone())
                .collect()
        }
    }

    impl WeatherSource for ScriptedSource {
        fn current<'a>(
            &'a self,
            query: &'a LocationQuery,
        ) -> BoxFuture<'a, Result<WeatherSnapshot, WeatherError>> {
            let step = self.steps.lock().unwrap().pop_front().unwrap_or_else(|| ok(20));
            self.calls
                .lock()
                .unwrap()
                .push((self.start.elapsed(), query.clone()));

            async move {
                if !step.delay.is_zero() {
                    time::sleep(step.delay).await;
                }
                step.outcome
                    .map(|temperature| snapshot(&query.to_string(), temperature))
                    .map_err(|message| WeatherError::Api {
                        status: 503,
                        message: message.to_string(),
                    })
            }
            .boxed()
        }
    }

    fn snapshot(name: &str, temperature: i32) -> WeatherSnapshot {
        WeatherSnapshot {
            location: SnapshotLocation {
                name: name.to_string(),
                country: "IN".to_string(),
                coordinates: Coordinates::new(12.97, 77.59),
            },
            current: CurrentConditions {
                temperature,
                feels_like: temperature,
                humidity: 60,
                pressure: 1012,
                visibility: 10,
                wind_speed: 12,
                wind_direction: 90,
                condition: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
                icon: "03d".to_string(),
            },
            timestamp: Utc::now(),
            status: OperationalStatus::Operational,
        }
    }

    fn config(max_retries: u32) -> RefreshConfig {
        RefreshConfig {
            refresh_interval: Duration::from_secs(300),
            max_retries,
        }
    }

    async fn advance_ms(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_backoff_delays_double() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4000));
        assert_eq!(backoff_delay(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Online.label(0, 3), "ONLINE");
        assert_eq!(ConnectionStatus::Reconnecting.label(2, 3), "RECONNECTING (2/3)");
        assert_eq!(ConnectionStatus::Offline.label(3, 3), "OFFLINE");
    }

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.max_retries, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_success() {
        let source = ScriptedSource::new(vec![ok(27)]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(10).await;

        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
        assert!(!session.is_loading);
        assert!(session.error.is_none());
        assert!(session.last_updated.is_some());
        assert_eq!(session.weather_data.unwrap().current.temperature, 27);
        assert_eq!(source.queries(), vec![LocationQuery::Name("Bengaluru".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coordinates_take_precedence() {
        let source = ScriptedSource::new(vec![]);
        let coordinates = Coordinates::new(-33.8688, 151.2093);
        let _handle = subscribe(
            source.clone(),
            Location::with_coordinates("Sydney", coordinates),
            config(3),
        );

        advance_ms(10).await;

        assert_eq!(source.queries(), vec![LocationQuery::Coordinates(coordinates)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_loading_while_fetch_outstanding() {
        let source = ScriptedSource::new(vec![slow(ok(20), Duration::from_secs(2))]);
        let handle = subscribe(source, Location::named("Bengaluru"), config(3));

        advance_ms(100).await;
        assert!(handle.session().is_loading);

        advance_ms(2000).await;
        assert!(!handle.session().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sequence_then_offline() {
        let source = ScriptedSource::new(vec![fail(), fail(), fail(), fail()]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(500).await;
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Reconnecting);
        assert_eq!(session.retry_count, 1);
        assert_eq!(session.status_label(), "RECONNECTING (1/3)");
        assert!(session.weather_data.is_none());
        assert_eq!(session.error.as_deref(), Some("upstream unavailable"));

        advance_ms(700_000).await;

        assert_eq!(source.call_times_ms(), vec![0, 1000, 3000, 7000]);
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Offline);
        assert_eq!(session.retry_count, 3);
        assert!(session.weather_data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_goes_straight_offline() {
        let source = ScriptedSource::new(vec![fail()]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(0));

        advance_ms(1_000_000).await;

        assert_eq!(source.call_times_ms(), vec![0]);
        assert_eq!(handle.session().connection_status, ConnectionStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_failure_schedules_backoff_instead_of_next_tick() {
        let source = ScriptedSource::new(vec![ok(25), fail(), ok(26)]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(300_500).await;
        assert_eq!(source.call_times_ms(), vec![0, 300_000]);
        assert_eq!(handle.session().connection_status, ConnectionStatus::Reconnecting);

        advance_ms(350_000).await;
        assert_eq!(source.call_times_ms(), vec![0, 300_000, 301_000, 601_000]);
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_periodic_fetch_while_offline() {
        let source = ScriptedSource::new(vec![ok(25), fail(), fail()]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(1));

        advance_ms(2_000_000).await;

        assert_eq!(source.call_times_ms(), vec![0, 300_000, 301_000]);
        assert_eq!(handle.session().connection_status, ConnectionStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_leaves_offline() {
        let source = ScriptedSource::new(vec![fail(), fail(), ok(30)]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(1));

        advance_ms(10_000).await;
        assert_eq!(handle.session().connection_status, ConnectionStatus::Offline);

        handle.force_refresh();
        advance_ms(10).await;

        assert_eq!(source.call_times_ms(), vec![0, 1000, 10_000]);
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
        assert_eq!(session.weather_data.unwrap().current.temperature, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_clears_error_while_fetching() {
        let source = ScriptedSource::new(vec![fail(), slow(ok(24), Duration::from_secs(5))]);
        let handle = subscribe(source, Location::named("Bengaluru"), config(0));

        advance_ms(10).await;
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Offline);
        assert!(session.error.is_some());

        handle.force_refresh();
        advance_ms(100).await;

        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert!(session.is_loading);
        assert!(session.error.is_none());
        assert!(session.weather_data.is_none());

        advance_ms(5000).await;
        assert_eq!(handle.session().weather_data.unwrap().current.temperature, 24);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_while_reconnecting_resets_count() {
        let source = ScriptedSource::new(vec![fail(), fail(), fail()]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(1500).await;
        assert_eq!(handle.session().retry_count, 2);

        handle.force_refresh();
        advance_ms(10).await;

        // The pending 2s backoff was cancelled; the manual attempt failed from a fresh count
        let session = handle.session();
        assert_eq!(session.retry_count, 1);
        assert_eq!(session.connection_status, ConnectionStatus::Reconnecting);

        advance_ms(995).await;
        assert_eq!(source.call_times_ms(), vec![0, 1000, 1500, 2500]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_cancels_backoff() {
        let source = ScriptedSource::new(vec![fail(), ok(18)]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(400).await;
        assert_eq!(handle.session().retry_count, 1);

        handle.set_location(Location::named("Paris"));
        advance_ms(5000).await;

        assert_eq!(source.call_times_ms(), vec![0, 400]);
        assert_eq!(
            source.queries(),
            vec![
                LocationQuery::Name("Bengaluru".into()),
                LocationQuery::Name("Paris".into())
            ]
        );
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
        assert_eq!(session.weather_data.unwrap().location.name, "Paris");
    }

    #[tokio::test(start_paused = true)]
    async fn test_coordinate_change_resets_retries() {
        let source = ScriptedSource::new(vec![fail(), fail()]);
        let before = Coordinates::new(12.9716, 77.5946);
        let after = Coordinates::new(13.0827, 80.2707);
        let handle = subscribe(
            source.clone(),
            Location::with_coordinates("Office", before),
            config(3),
        );

        advance_ms(1500).await;
        assert_eq!(handle.session().retry_count, 2);

        handle.set_location(Location::with_coordinates("Office", after));
        advance_ms(10).await;

        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
        assert_eq!(
            source.queries(),
            vec![
                LocationQuery::Coordinates(before),
                LocationQuery::Coordinates(before),
                LocationQuery::Coordinates(after),
            ]
        );
        // The 2s backoff armed for the old coordinates never fires
        advance_ms(5000).await;
        assert_eq!(source.call_times_ms(), vec![0, 1000, 1500]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_keeps_previous_data_until_new_arrives() {
        let source = ScriptedSource::new(vec![ok(31), slow(ok(12), Duration::from_secs(3))]);
        let handle = subscribe(source, Location::named("Bengaluru"), config(3));

        advance_ms(10).await;
        handle.set_location(Location::named("London"));
        advance_ms(1000).await;

        let session = handle.session();
        assert!(session.is_loading);
        assert_eq!(session.weather_data.unwrap().current.temperature, 31);

        advance_ms(3000).await;
        assert_eq!(
            handle.session().weather_data.unwrap().current.temperature,
            12
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_response_is_discarded() {
        let source = ScriptedSource::new(vec![
            slow(fail(), Duration::from_secs(5)),
            slow(ok(22), Duration::from_secs(1)),
        ]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(100).await;
        handle.force_refresh();
        advance_ms(6000).await;

        // The slow failure finished last but was issued first
        let session = handle.session();
        assert_eq!(session.connection_status, ConnectionStatus::Online);
        assert_eq!(session.retry_count, 0);
        assert!(session.error.is_none());
        assert_eq!(session.weather_data.unwrap().current.temperature, 22);
        assert_eq!(source.call_times_ms(), vec![0, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_all_timers() {
        let source = ScriptedSource::new(vec![fail()]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));
        let updates = handle.updates();

        advance_ms(10).await;
        handle.dispose();
        assert!(handle.is_disposed());
        assert!(updates.has_changed().is_err());

        advance_ms(1_000_000).await;
        assert_eq!(source.call_times_ms(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let source = ScriptedSource::new(vec![ok(20)]);
        let handle = subscribe(source.clone(), Location::named("Bengaluru"), config(3));

        advance_ms(10).await;
        drop(handle);
        advance_ms(1_000_000).await;

        assert_eq!(source.call_times_ms(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_are_published() {
        let source = ScriptedSource::new(vec![slow(ok(19), Duration::from_millis(50))]);
        let handle = subscribe(source, Location::named("Bengaluru"), config(3));
        let mut updates = handle.updates();

        let session = updates
            .wait_for(|s| s.weather_data.is_some())
            .await
            .expect("controller should still be running")
            .clone();

        assert_eq!(session.weather_data.unwrap().current.temperature, 19);
        assert_eq!(session.max_retries, 3);
    }
}
