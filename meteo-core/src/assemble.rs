use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::catalog::{ForecastModel, Location, LocationCatalog};
use crate::client::{ForecastFetcher, RawDaily, RawHourly};
use crate::model::{DailyRecord, ForecastBundle, HourlyRecord, parse_date, parse_datetime};

/// Drives one fetch per catalog location and merges the results into the
/// unified daily and hourly datasets.
pub struct DataAssembler {
    fetcher: Arc<dyn ForecastFetcher>,
    catalog: LocationCatalog,
    inter_request_delay: Duration,
}

impl DataAssembler {
    pub fn new(
        fetcher: Arc<dyn ForecastFetcher>,
        catalog: LocationCatalog,
        inter_request_delay: Duration,
    ) -> Self {
        Self { fetcher, catalog, inter_request_delay }
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// Assemble the datasets for one model, visiting locations in catalog
    /// order with the configured minimum spacing between requests. A
    /// failing location is skipped and recorded as a warning; if every
    /// location fails the datasets are empty and the caller decides how to
    /// surface that.
    pub async fn assemble(&self, model: ForecastModel) -> ForecastBundle {
        let mut daily = Vec::new();
        let mut hourly = Vec::new();
        let mut warnings = Vec::new();

        for (index, location) in self.catalog.iter().enumerate() {
            if index > 0 && !self.inter_request_delay.is_zero() {
                tokio::time::sleep(self.inter_request_delay).await;
            }

            match self.fetcher.fetch(location, model).await {
                Ok(raw) => {
                    daily.extend(daily_records(location, &raw.daily));
                    hourly.extend(hourly_records(location, &raw.hourly));
                }
                Err(err) => {
                    warn!(location = %location.name, error = %err, "skipping location");
                    warnings.push(err.into());
                }
            }
        }

        ForecastBundle { model, daily, hourly, warnings }
    }
}

/// Element `i` of an index-aligned field array; short arrays yield missing
/// values rather than a fault.
fn field(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn text_field(values: &[Option<String>], index: usize) -> Option<&str> {
    values.get(index).and_then(|v| v.as_deref())
}

/// One record per entry of the daily time array, in payload order.
fn daily_records(location: &Location, block: &RawDaily) -> Vec<DailyRecord> {
    block
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| DailyRecord {
            location: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            date: parse_date(time),
            temperature_max: field(&block.temperature_2m_max, i),
            temperature_min: field(&block.temperature_2m_min, i),
            precipitation_sum: field(&block.precipitation_sum, i),
            precipitation_probability: field(&block.precipitation_probability_max, i),
            wind_speed_max: field(&block.wind_speed_10m_max, i),
            wind_gusts_max: field(&block.wind_gusts_10m_max, i),
            sunrise: text_field(&block.sunrise, i).and_then(parse_datetime),
            sunset: text_field(&block.sunset, i).and_then(parse_datetime),
            daylight_seconds: field(&block.daylight_duration, i),
            uv_index_max: field(&block.uv_index_max, i),
        })
        .collect()
}

/// One record per entry of the hourly time array, in payload order.
fn hourly_records(location: &Location, block: &RawHourly) -> Vec<HourlyRecord> {
    block
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| HourlyRecord {
            location: location.name.clone(),
            time: parse_datetime(time),
            temperature: field(&block.temperature_2m, i),
            relative_humidity: field(&block.relative_humidity_2m, i),
            wind_speed: field(&block.wind_speed_10m, i),
            wind_direction: field(&block.wind_direction_10m, i),
            cloud_cover: field(&block.cloudcover, i),
            precipitation_probability: field(&block.precipitation_probability, i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RawForecast;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    /// Succeeds for the locations it has a payload for, fails the rest.
    struct ScriptedFetcher {
        ok: HashMap<String, RawForecast>,
    }

    #[async_trait]
    impl ForecastFetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            location: &Location,
            _model: ForecastModel,
        ) -> Result<RawForecast, FetchError> {
            self.ok.get(&location.name).cloned().ok_or_else(|| FetchError::Status {
                location: location.name.clone(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "upstream down".to_string(),
            })
        }
    }

    fn location(name: &str) -> Location {
        Location { name: name.to_string(), latitude: 46.3, longitude: -0.5 }
    }

    fn three_day_payload() -> RawForecast {
        serde_json::from_value(json!({
            "daily": {
                "time": ["2025-03-14", "2025-03-15", "2025-03-16"],
                "temperature_2m_max": [12.0, 13.5, null],
                "precipitation_sum": [0.0, 2.0, 1.0]
            },
            "hourly": {
                "time": ["2025-03-14T00:00", "2025-03-14T01:00"],
                "temperature_2m": [5.0, 4.5],
                "wind_speed_10m": [10.0, 12.0],
                "wind_direction_10m": [180.0, 185.0]
            }
        }))
        .unwrap()
    }

    fn assembler(fetcher: ScriptedFetcher, catalog: Vec<Location>) -> DataAssembler {
        DataAssembler::new(Arc::new(fetcher), LocationCatalog::new(catalog), Duration::ZERO)
    }

    #[tokio::test]
    async fn failing_location_is_skipped_with_a_warning() {
        let fetcher = ScriptedFetcher {
            ok: HashMap::from([("Niort".to_string(), three_day_payload())]),
        };
        let assembler = assembler(fetcher, vec![location("Niort"), location("Bressuire")]);

        let bundle = assembler.assemble(ForecastModel::Arome).await;

        assert_eq!(bundle.daily.len(), 3);
        assert!(bundle.daily.iter().all(|r| r.location == "Niort"));
        assert_eq!(bundle.warnings.len(), 1);
        assert_eq!(bundle.warnings[0].location, "Bressuire");
    }

    #[tokio::test]
    async fn all_locations_failing_yields_empty_datasets_not_a_fault() {
        let fetcher = ScriptedFetcher { ok: HashMap::new() };
        let assembler = assembler(fetcher, vec![location("Niort"), location("Bressuire")]);

        let bundle = assembler.assemble(ForecastModel::Gfs).await;

        assert!(bundle.is_empty());
        assert_eq!(bundle.warnings.len(), 2);
    }

    #[tokio::test]
    async fn every_row_belongs_to_a_catalog_location() {
        let fetcher = ScriptedFetcher {
            ok: HashMap::from([
                ("Niort".to_string(), three_day_payload()),
                ("Bressuire".to_string(), three_day_payload()),
            ]),
        };
        let assembler = assembler(fetcher, vec![location("Niort"), location("Bressuire")]);

        let bundle = assembler.assemble(ForecastModel::Arome).await;

        for record in &bundle.daily {
            assert!(assembler.catalog().contains(&record.location));
        }
        for record in &bundle.hourly {
            assert!(assembler.catalog().contains(&record.location));
        }
    }

    #[tokio::test]
    async fn payload_order_is_preserved_per_location() {
        let fetcher = ScriptedFetcher {
            ok: HashMap::from([
                ("Niort".to_string(), three_day_payload()),
                ("Bressuire".to_string(), three_day_payload()),
            ]),
        };
        let assembler = assembler(fetcher, vec![location("Niort"), location("Bressuire")]);

        let bundle = assembler.assemble(ForecastModel::Arome).await;

        // Location blocks in catalog order, dates in payload order within each.
        let locations: Vec<&str> =
            bundle.daily.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(
            locations,
            ["Niort", "Niort", "Niort", "Bressuire", "Bressuire", "Bressuire"]
        );

        let expected = ["2025-03-14", "2025-03-15", "2025-03-16"];
        for (record, want) in bundle.daily.iter().take(3).zip(expected) {
            assert_eq!(record.date, parse_date(want));
        }
    }

    #[tokio::test]
    async fn nulls_and_short_arrays_become_missing_values() {
        let fetcher = ScriptedFetcher {
            ok: HashMap::from([("Niort".to_string(), three_day_payload())]),
        };
        let assembler = assembler(fetcher, vec![location("Niort")]);

        let bundle = assembler.assemble(ForecastModel::Arome).await;

        // Null in the payload.
        assert_eq!(bundle.daily[2].temperature_max, None);
        // Field absent from the payload altogether.
        assert!(bundle.daily.iter().all(|r| r.uv_index_max.is_none()));
        // Never defaulted to zero.
        assert_eq!(bundle.daily[0].precipitation_sum, Some(0.0));
        assert_eq!(bundle.daily[1].precipitation_sum, Some(2.0));
    }

    #[tokio::test]
    async fn unparseable_times_propagate_as_missing() {
        let payload: RawForecast = serde_json::from_value(json!({
            "daily": { "time": ["garbage"], "temperature_2m_max": [10.0] },
            "hourly": { "time": ["2025-03-14T00:00"] }
        }))
        .unwrap();
        let fetcher = ScriptedFetcher {
            ok: HashMap::from([("Niort".to_string(), payload)]),
        };
        let assembler = assembler(fetcher, vec![location("Niort")]);

        let bundle = assembler.assemble(ForecastModel::Arome).await;

        assert_eq!(bundle.daily.len(), 1);
        assert_eq!(bundle.daily[0].date, None);
        assert_eq!(bundle.daily[0].temperature_max, Some(10.0));
    }
}
