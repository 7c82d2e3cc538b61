use chrono::{NaiveDate, NaiveDateTime};

use crate::catalog::ForecastModel;
use crate::error::FetchWarning;

/// One row per (location, calendar date). Every numeric field is optional:
/// a value the provider omitted stays missing until a consumer explicitly
/// defaults it for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyRecord {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub date: Option<NaiveDate>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub daylight_seconds: Option<f64>,
    pub uv_index_max: Option<f64>,
}

/// One row per (location, hour). Same nullability rule as [`DailyRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyRecord {
    pub location: String,
    pub time: Option<NaiveDateTime>,
    pub temperature: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

/// The unified daily and hourly datasets assembled in one fetch cycle,
/// plus the locations that had to be skipped. The two datasets always
/// originate from the same cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBundle {
    pub model: ForecastModel,
    pub daily: Vec<DailyRecord>,
    pub hourly: Vec<HourlyRecord>,
    pub warnings: Vec<FetchWarning>,
}

impl ForecastBundle {
    /// True when every location failed and there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.hourly.is_empty()
    }
}

/// Parse the provider's daily date format ("2025-03-14"). Invalid input
/// propagates as a missing value, not a fault.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse the provider's local date-time format ("2025-03-14T06:45").
pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok()
}
