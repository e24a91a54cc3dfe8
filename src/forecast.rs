//! Daily forecast aggregation
//!
//! Turns the upstream 3-hourly sample list into a fixed seven-day outlook. The
//! first sample seen for each UTC calendar date represents that day. When the
//! upstream covers fewer than seven dates (the usual 5-day feed), the remaining
//! days are projected from the day before them with small bounded drift.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::Rng;
use thiserror::Error;

use crate::data::weather::ms_to_kmh;
use crate::data::{DailyForecast, RawForecastSample};

/// Number of days in the outlook
pub const OUTLOOK_DAYS: usize = 7;

/// Maximum day-to-day temperature drift for projected days (°C)
const TEMP_DRIFT: i32 = 3;
/// Maximum day-to-day humidity drift for projected days (%)
const HUMIDITY_DRIFT: i32 = 10;
/// Maximum day-to-day wind drift for projected days (km/h)
const WIND_DRIFT: i32 = 5;

const HUMIDITY_FLOOR: i32 = 20;
const HUMIDITY_CEILING: i32 = 90;

/// Errors that can occur while building the outlook
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForecastError {
    /// No samples to seed the outlook from
    #[error("Forecast series is empty; nothing to aggregate")]
    EmptySeries,

    /// A sample's timestamp can't be represented as a date
    #[error("Invalid sample timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Source of the random drift applied to projected days
///
/// Every `rand::Rng` is a drift source; tests can supply fixed sequences.
pub trait DriftSource {
    /// Returns an integer uniformly drawn from `[-bound, bound]`
    fn drift(&mut self, bound: i32) -> i32;
}

impl<R: Rng + ?Sized> DriftSource for R {
    fn drift(&mut self, bound: i32) -> i32 {
        self.gen_range(-bound..=bound)
    }
}

/// Builds the seven-day outlook using the thread-local RNG for projections
pub fn aggregate(samples: &[RawForecastSample]) -> Result<Vec<DailyForecast>, ForecastError> {
    aggregate_with(samples, &mut rand::thread_rng())
}

/// Builds the seven-day outlook, drawing projection drift from `drift`
///
/// # Returns
/// * `Ok(Vec<DailyForecast>)` - exactly seven days in ascending date order, real days first
/// * `Err(ForecastError::EmptySeries)` - if `samples` is empty
pub fn aggregate_with<D: DriftSource + ?Sized>(
    samples: &[RawForecastSample],
    drift: &mut D,
) -> Result<Vec<DailyForecast>, ForecastError> {
    let mut days: Vec<DailyForecast> = Vec::with_capacity(OUTLOOK_DAYS);

    for sample in samples {
        if days.len() == OUTLOOK_DAYS {
            break;
        }
        let date = sample_date(sample.timestamp)?;
        if days.iter().any(|day| day.date == date) {
            continue;
        }
        days.push(real_day(date, sample));
    }

    let Some(last_real) = days.last() else {
        return Err(ForecastError::EmptySeries);
    };
    let real_count = days.len();
    let mut previous = last_real.clone();

    while days.len() < OUTLOOK_DAYS {
        let next = project_day(&previous, drift);
        days.push(next.clone());
        previous = next;
    }

    tracing::debug!(
        real_days = real_count,
        projected_days = OUTLOOK_DAYS - real_count,
        "aggregated daily outlook"
    );
    Ok(days)
}

/// UTC calendar date of a Unix timestamp
fn sample_date(timestamp: i64) -> Result<NaiveDate, ForecastError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or(ForecastError::InvalidTimestamp(timestamp))
}

/// Builds a day backed by an upstream sample
fn real_day(date: NaiveDate, sample: &RawForecastSample) -> DailyForecast {
    let high = sample.temp_max.round() as i32;
    let low = sample.temp_min.round() as i32;
    DailyForecast {
        date,
        day: weekday_label(date.weekday()).to_string(),
        temp_max: high.max(low),
        temp_min: high.min(low),
        condition: sample.condition.to_uppercase(),
        humidity: sample.humidity,
        wind_speed: ms_to_kmh(sample.wind_speed),
        icon: sample.icon.clone(),
        projected: false,
    }
}

/// Extrapolates the day after `previous`
fn project_day<D: DriftSource + ?Sized>(previous: &DailyForecast, drift: &mut D) -> DailyForecast {
    let date = previous.date + Duration::days(1);

    let temp_delta = drift.drift(TEMP_DRIFT);
    let temp_min = (previous.temp_min + temp_delta - 2).max(0);
    let temp_max = (previous.temp_max + temp_delta)
        .max(previous.temp_min + 2)
        .max(temp_min);

    let humidity = (i32::from(previous.humidity) + drift.drift(HUMIDITY_DRIFT))
        .clamp(HUMIDITY_FLOOR, HUMIDITY_CEILING);
    let wind_speed = (previous.wind_speed as i32 + drift.drift(WIND_DRIFT)).max(0);

    DailyForecast {
        date,
        day: weekday_label(date.weekday()).to_string(),
        temp_max,
        temp_min,
        condition: previous.condition.clone(),
        humidity: humidity as u8,
        wind_speed: wind_speed as u32,
        icon: previous.icon.clone(),
        projected: true,
    }
}

/// Upper-case English weekday name
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}
