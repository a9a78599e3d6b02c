//! Core library for the QWeather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider abstraction and its QWeather client
//! - Historical weather aggregation (date range, per-day reduction)
//! - The lookup / current / forecast / history services
//!
//! It is used by `weather-proxy`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;
pub mod service;

pub use config::{Config, Overrides};
pub use error::{ProviderError, WeatherError};
pub use model::{CityLocation, CurrentConditions, DayAggregate, Reading, Temperature, UNKNOWN};
pub use provider::{WeatherProvider, provider_from_config};
