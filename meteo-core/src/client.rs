use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::catalog::{ForecastModel, Location};
use crate::config::Settings;
use crate::error::FetchError;

/// Production endpoint; tests point the client at a mock server instead.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com";

/// Daily fields requested from the provider, kept in sync with the record
/// mapping in `assemble`.
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,\
wind_speed_10m_max,wind_gusts_10m_max,sunrise,sunset,uv_index_max,daylight_duration,\
precipitation_probability_max";

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,\
wind_direction_10m,cloudcover,precipitation_probability";

/// Seam between the assembler and the network; implemented by the real
/// Open-Meteo client and by test doubles.
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    async fn fetch(
        &self,
        location: &Location,
        model: ForecastModel,
    ) -> Result<RawForecast, FetchError>;
}

/// One forecast response for a single location. A payload missing either
/// block is rejected as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecast {
    pub daily: RawDaily,
    pub hourly: RawHourly,
}

/// Index-aligned daily arrays: element `i` of every field belongs to
/// `time[i]`. A field the provider omitted entirely deserializes to an
/// empty vector and reads back as missing values, never as zeros.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDaily {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_gusts_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
    #[serde(default)]
    pub daylight_duration: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
}

/// Index-aligned hourly arrays, same conventions as [`RawDaily`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub cloudcover: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
    forecast_days: u8,
}

impl OpenMeteoClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_base_url(OPEN_METEO_URL, settings)
    }

    /// Client against an explicit base URL, used by the wiremock tests.
    pub fn with_base_url(base_url: &str, settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            forecast_days: settings.forecast_days,
        })
    }
}

#[async_trait]
impl ForecastFetcher for OpenMeteoClient {
    async fn fetch(
        &self,
        location: &Location,
        model: ForecastModel,
    ) -> Result<RawForecast, FetchError> {
        #[derive(Serialize)]
        struct Query<'a> {
            latitude: f64,
            longitude: f64,
            models: &'a str,
            daily: &'a str,
            hourly: &'a str,
            timezone: &'a str,
            forecast_days: u8,
        }

        let url = format!("{}/v1/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&Query {
                latitude: location.latitude,
                longitude: location.longitude,
                models: model.model_id(),
                daily: DAILY_FIELDS,
                hourly: HOURLY_FIELDS,
                timezone: "Europe/Paris",
                forecast_days: self.forecast_days,
            })
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                location: location.name.clone(),
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Transport {
            location: location.name.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.name.clone(),
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::MalformedPayload {
            location: location.name.clone(),
            reason: e.to_string(),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary so multi-byte bodies cannot panic.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
