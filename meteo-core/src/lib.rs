//! Core library for the Deux-Sèvres weather board.
//!
//! This crate defines:
//! - The fixed location catalog and forecast model registry
//! - An Open-Meteo client with per-location failure isolation
//! - Assembly of per-location payloads into unified daily/hourly datasets
//! - A TTL cache over assembled dataset pairs
//! - Pure aggregation views consumed by the presentation layer
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod assemble;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use assemble::DataAssembler;
pub use cache::{Clock, ForecastCache, SystemClock};
pub use catalog::{ForecastModel, Location, LocationCatalog};
pub use client::{ForecastFetcher, OpenMeteoClient, RawForecast};
pub use config::Settings;
pub use error::{FetchError, FetchWarning, ValueRangeError};
pub use model::{DailyRecord, ForecastBundle, HourlyRecord};
