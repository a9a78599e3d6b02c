use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// Marker the UI renders for anything that could not be determined.
pub const UNKNOWN: &str = "未知";

/// A value that is either known or explicitly unavailable.
///
/// Only the JSON boundary turns `Unknown` into the [`UNKNOWN`] string, so an
/// upstream label that happens to read "未知" stays distinguishable in code.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Known(T),
    Unknown,
}

impl<T> Reading<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Reading::Known(_))
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Unknown, Reading::Known)
    }
}

impl<T: Display> Display for Reading<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Known(v) => v.fmt(f),
            Reading::Unknown => f.pad(UNKNOWN),
        }
    }
}

impl Reading<Temperature> {
    pub fn measured(celsius: f64) -> Self {
        Reading::Known(Temperature::Measured(celsius))
    }

    pub fn reported(text: impl Into<String>) -> Self {
        Reading::Known(Temperature::Reported(text.into()))
    }
}

impl<T: Display> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A temperature as it goes out on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Temperature {
    /// Reduced from hourly samples.
    Measured(f64),
    /// Copied from an upstream daily summary exactly as given.
    Reported(String),
}

impl Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 prints as "0"
            Temperature::Measured(v) if *v == 0.0 => 0.0_f64.fmt(f),
            Temperature::Measured(v) => v.fmt(f),
            Temperature::Reported(text) => f.pad(text),
        }
    }
}

/// One day of aggregated historical weather.
///
/// Serialized with the same keys as an upstream daily-forecast entry so the
/// UI can render history and forecast rows alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAggregate {
    /// `YYYYMMDD`
    #[serde(rename = "fxDate")]
    pub date: String,
    #[serde(rename = "textDay")]
    pub dominant_condition: Reading<String>,
    #[serde(rename = "tempMin")]
    pub min_temperature: Reading<Temperature>,
    #[serde(rename = "tempMax")]
    pub max_temperature: Reading<Temperature>,
}

impl DayAggregate {
    /// The sentinel record: every field unknown.
    pub fn unknown(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            dominant_condition: Reading::Unknown,
            min_temperature: Reading::Unknown,
            max_temperature: Reading::Unknown,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !self.dominant_condition.is_known()
            && !self.min_temperature.is_known()
            && !self.max_temperature.is_known()
    }
}

/// One geocoding hit. Only `id` is interpreted; everything else passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{ city, ...now }` as returned by `GET /api/weather`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub city: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
