//! Derived views over the unified datasets.
//!
//! Everything here is a pure function of its inputs: no state is retained
//! between calls, and a field that is missing everywhere stays missing in
//! the output instead of turning into a zero.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValueRangeError;
use crate::model::{DailyRecord, HourlyRecord};

/// Department-wide arithmetic means of the daily fields for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentDaily {
    pub date: NaiveDate,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub uv_index_max: Option<f64>,
}

fn mean<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Group daily records by date and average each numeric field across
/// locations, ignoring missing values. Dates with no contributing records
/// do not appear in the output.
pub fn department_means(daily: &[DailyRecord]) -> Vec<DepartmentDaily> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&DailyRecord>> = BTreeMap::new();
    for record in daily {
        if let Some(date) = record.date {
            by_date.entry(date).or_default().push(record);
        }
    }

    by_date
        .into_iter()
        .map(|(date, rows)| DepartmentDaily {
            date,
            temperature_max: mean(rows.iter().map(|r| r.temperature_max)),
            temperature_min: mean(rows.iter().map(|r| r.temperature_min)),
            precipitation_sum: mean(rows.iter().map(|r| r.precipitation_sum)),
            precipitation_probability: mean(rows.iter().map(|r| r.precipitation_probability)),
            wind_speed_max: mean(rows.iter().map(|r| r.wind_speed_max)),
            wind_gusts_max: mean(rows.iter().map(|r| r.wind_gusts_max)),
            uv_index_max: mean(rows.iter().map(|r| r.uv_index_max)),
        })
        .collect()
}

/// Running total of the mean daily precipitation, in date order. The total
/// restarts at zero on every invocation; a missing mean leaves it unchanged.
pub fn cumulative_precipitation(means: &[DepartmentDaily]) -> Vec<(NaiveDate, f64)> {
    let mut total = 0.0;
    means
        .iter()
        .map(|day| {
            if let Some(mm) = day.precipitation_sum {
                total += mm;
            }
            (day.date, total)
        })
        .collect()
}

/// Intensity class of a mean daily precipitation total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrecipitationClass {
    Dry,
    Drizzle,
    Light,
    Moderate,
    Heavy,
}

impl PrecipitationClass {
    pub const fn all() -> &'static [PrecipitationClass] {
        &[
            PrecipitationClass::Dry,
            PrecipitationClass::Drizzle,
            PrecipitationClass::Light,
            PrecipitationClass::Moderate,
            PrecipitationClass::Heavy,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationClass::Dry => "dry",
            PrecipitationClass::Drizzle => "drizzle",
            PrecipitationClass::Light => "light",
            PrecipitationClass::Moderate => "moderate",
            PrecipitationClass::Heavy => "heavy",
        }
    }
}

impl std::fmt::Display for PrecipitationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Assign a precipitation total (mm) to its intensity class. Bins are the
/// half-open intervals (-0.1, 0.2], (0.2, 1], (1, 5], (5, 10], (10, 100];
/// anything outside (-0.1, 100] is a range fault rather than a guess.
pub fn classify_precipitation(mm: f64) -> Result<PrecipitationClass, ValueRangeError> {
    if !(mm > -0.1 && mm <= 100.0) {
        return Err(ValueRangeError { value: mm, min: -0.1, max: 100.0 });
    }

    Ok(if mm <= 0.2 {
        PrecipitationClass::Dry
    } else if mm <= 1.0 {
        PrecipitationClass::Drizzle
    } else if mm <= 5.0 {
        PrecipitationClass::Light
    } else if mm <= 10.0 {
        PrecipitationClass::Moderate
    } else {
        PrecipitationClass::Heavy
    })
}

/// Tally department mean days per intensity class. Every class appears in
/// the result, including empty ones; days with a missing mean are not
/// counted.
pub fn precipitation_class_counts(
    means: &[DepartmentDaily],
) -> Result<Vec<(PrecipitationClass, usize)>, ValueRangeError> {
    let mut counts: BTreeMap<PrecipitationClass, usize> =
        PrecipitationClass::all().iter().map(|class| (*class, 0)).collect();

    for day in means {
        if let Some(mm) = day.precipitation_sum {
            *counts.entry(classify_precipitation(mm)?).or_insert(0) += 1;
        }
    }

    Ok(counts.into_iter().collect())
}

/// 16-sector compass rose, 22.5° per sector, with N centered on 0°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompassSector {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl CompassSector {
    pub const fn all() -> &'static [CompassSector] {
        use CompassSector::*;
        &[N, Nne, Ne, Ene, E, Ese, Se, Sse, S, Ssw, Sw, Wsw, W, Wnw, Nw, Nnw]
    }

    pub fn label(&self) -> &'static str {
        use CompassSector::*;
        match self {
            N => "N",
            Nne => "NNE",
            Ne => "NE",
            Ene => "ENE",
            E => "E",
            Ese => "ESE",
            Se => "SE",
            Sse => "SSE",
            S => "S",
            Ssw => "SSW",
            Sw => "SW",
            Wsw => "WSW",
            W => "W",
            Wnw => "WNW",
            Nw => "NW",
            Nnw => "NNW",
        }
    }

    /// Sector containing a wind direction in degrees. Sectors are centered
    /// on the compass points, so both 0° and 359.9° fall in N. Directions
    /// outside 0..=360 are a range fault.
    pub fn from_degrees(degrees: f64) -> Result<Self, ValueRangeError> {
        if !(0.0..=360.0).contains(&degrees) {
            return Err(ValueRangeError { value: degrees, min: 0.0, max: 360.0 });
        }
        let index = ((degrees / 22.5).round() as usize) % 16;
        Ok(Self::all()[index])
    }
}

impl std::fmt::Display for CompassSector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Mean wind speed of the hourly records whose direction fell in a sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorWind {
    pub sector: CompassSector,
    pub mean_speed: f64,
    pub samples: usize,
}

/// Wind rose over a set of hourly records. Records missing either the
/// direction or the speed are skipped; sectors with no contributing
/// records are omitted, not reported as zero.
pub fn wind_rose(hourly: &[HourlyRecord]) -> Result<Vec<SectorWind>, ValueRangeError> {
    let mut sums: BTreeMap<CompassSector, (f64, usize)> = BTreeMap::new();

    for record in hourly {
        let (Some(direction), Some(speed)) = (record.wind_direction, record.wind_speed) else {
            continue;
        };
        let slot = sums.entry(CompassSector::from_degrees(direction)?).or_insert((0.0, 0));
        slot.0 += speed;
        slot.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(sector, (sum, samples))| SectorWind {
            sector,
            mean_speed: sum / samples as f64,
            samples,
        })
        .collect())
}

/// Hourly fields selectable for the cross-location band computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourlyMetric {
    Temperature,
    RelativeHumidity,
    WindSpeed,
    CloudCover,
    PrecipitationProbability,
}

impl HourlyMetric {
    fn value(&self, record: &HourlyRecord) -> Option<f64> {
        match self {
            HourlyMetric::Temperature => record.temperature,
            HourlyMetric::RelativeHumidity => record.relative_humidity,
            HourlyMetric::WindSpeed => record.wind_speed,
            HourlyMetric::CloudCover => record.cloud_cover,
            HourlyMetric::PrecipitationProbability => record.precipitation_probability,
        }
    }
}

/// Min/mean/max of one metric across locations at one timestamp, used to
/// draw an envelope band.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBand {
    pub time: NaiveDateTime,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Envelope statistics per timestamp across whichever locations are in the
/// subset. Timestamps where every value is missing are omitted.
pub fn metric_bands(hourly: &[HourlyRecord], metric: HourlyMetric) -> Vec<MetricBand> {
    let mut by_time: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for record in hourly {
        let (Some(time), Some(value)) = (record.time, metric.value(record)) else {
            continue;
        };
        by_time.entry(time).or_default().push(value);
    }

    by_time
        .into_iter()
        .map(|(time, values)| {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            MetricBand { time, min, mean, max }
        })
        .collect()
}

/// Daily rows for one calendar date.
pub fn daily_on(daily: &[DailyRecord], date: NaiveDate) -> Vec<DailyRecord> {
    daily.iter().filter(|r| r.date == Some(date)).cloned().collect()
}

/// Hourly rows whose date falls within `from..=to`.
pub fn hourly_between(
    hourly: &[HourlyRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<HourlyRecord> {
    hourly
        .iter()
        .filter(|r| r.time.is_some_and(|t| (from..=to).contains(&t.date())))
        .cloned()
        .collect()
}

/// Hourly rows for a subset of locations.
pub fn hourly_for_locations(hourly: &[HourlyRecord], names: &[&str]) -> Vec<HourlyRecord> {
    hourly
        .iter()
        .filter(|r| names.contains(&r.location.as_str()))
        .cloned()
        .collect()
}

/// A location paired with the field value that made it stand out.
#[derive(Debug, Clone, PartialEq)]
pub struct Extreme {
    pub location: String,
    pub value: f64,
}

/// Headline figures for one date across the department. A field missing
/// everywhere yields `None`, never a fabricated zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyHighlights {
    pub warmest: Option<Extreme>,
    pub coldest: Option<Extreme>,
    pub gustiest: Option<Extreme>,
    pub wettest: Option<Extreme>,
    pub highest_precipitation_probability: Option<Extreme>,
    pub highest_uv: Option<Extreme>,
    pub mean_daylight_hours: Option<f64>,
}

/// Compute the highlights panel from the daily rows of one date.
pub fn daily_highlights(daily: &[DailyRecord]) -> DailyHighlights {
    DailyHighlights {
        warmest: extreme(daily, |r| r.temperature_max, true),
        coldest: extreme(daily, |r| r.temperature_min, false),
        gustiest: extreme(daily, |r| r.wind_gusts_max, true),
        wettest: extreme(daily, |r| r.precipitation_sum, true),
        highest_precipitation_probability: extreme(
            daily,
            |r| r.precipitation_probability,
            true,
        ),
        highest_uv: extreme(daily, |r| r.uv_index_max, true),
        mean_daylight_hours: mean(daily.iter().map(|r| r.daylight_seconds))
            .map(|secs| secs / 3600.0),
    }
}

fn extreme<F>(daily: &[DailyRecord], field: F, want_max: bool) -> Option<Extreme>
where
    F: Fn(&DailyRecord) -> Option<f64>,
{
    let mut best: Option<Extreme> = None;
    for record in daily {
        let Some(value) = field(record) else { continue };
        let better = match &best {
            None => true,
            Some(b) if want_max => value > b.value,
            Some(b) => value < b.value,
        };
        if better {
            best = Some(Extreme { location: record.location.clone(), value });
        }
    }
    best
}
