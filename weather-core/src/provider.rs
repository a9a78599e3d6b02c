//! The upstream contract and its QWeather implementation.
//!
//! Every QWeather body embeds its own status `code`; the payload types keep
//! it next to the data so callers decide what a failure means for them.

use crate::{Config, error::ProviderError, model::CityLocation, provider::qweather::QWeatherProvider};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt::Debug;

pub mod qweather;

/// The code QWeather uses for success.
pub const SUCCESS_CODE: &str = "200";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiStatus {
    pub fn success() -> Self {
        Self { code: SUCCESS_CODE.to_string(), message: None }
    }

    pub fn failure(code: impl Into<String>, message: Option<&str>) -> Self {
        Self { code: code.into(), message: message.map(str::to_owned) }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// `GET /geo/v2/city/lookup`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityLookup {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub location: Option<Vec<CityLocation>>,
}

/// `GET /v7/weather/now`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NowPayload {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub now: Option<Map<String, Value>>,
}

/// `GET /v7/weather/7d`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub daily: Option<Vec<Value>>,
}

/// `GET /v7/historical/weather`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalPayload {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default, rename = "weatherHourly")]
    pub weather_hourly: Option<Vec<HourlyRecord>>,
    #[serde(default)]
    pub daily: Option<Vec<DailyRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlyRecord {
    /// Usually a numeric string, e.g. `"12"`.
    #[serde(default)]
    pub temp: Option<Value>,
    /// Condition label; not always a string in practice.
    #[serde(default)]
    pub text: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailyRecord {
    #[serde(default, rename = "textDay")]
    pub text_day: Option<Value>,
    #[serde(default)]
    pub condition: Option<Value>,
    #[serde(default, rename = "tempMin")]
    pub temp_min: Option<Value>,
    #[serde(default, rename = "tempMax")]
    pub temp_max: Option<Value>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn lookup_city(&self, query: &str) -> Result<CityLookup, ProviderError>;

    async fn current(&self, location_id: &str) -> Result<NowPayload, ProviderError>;

    async fn forecast(&self, location_id: &str) -> Result<ForecastPayload, ProviderError>;

    /// `date` is `YYYYMMDD`.
    async fn historical(
        &self,
        location_id: &str,
        date: &str,
    ) -> Result<HistoricalPayload, ProviderError>;
}

/// Construct the QWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = QWeatherProvider::new(config)?;
    Ok(Box::new(provider))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(i64),
}

fn code_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<RawCode>::deserialize(deserializer)? {
        Some(RawCode::Text(s)) => s,
        Some(RawCode::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
