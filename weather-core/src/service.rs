//! One function per proxy operation. Each takes the provider explicitly so
//! the HTTP layer and the CLI share the same behavior.

use chrono::{DateTime, TimeZone};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::WeatherError,
    history::{aggregate_days, past_dates},
    model::{CityLocation, CurrentConditions, DayAggregate},
    provider::{ApiStatus, WeatherProvider},
};

/// First location id the geocoder returns for `city`.
pub async fn resolve_location(
    provider: &dyn WeatherProvider,
    city: &str,
) -> Result<String, WeatherError> {
    let lookup = provider.lookup_city(city).await?;

    let first = lookup
        .location
        .as_deref()
        .and_then(<[CityLocation]>::first)
        .filter(|_| lookup.status.is_success());

    match first {
        Some(location) => Ok(location.id.clone()),
        None => Err(WeatherError::CityNotFound {
            query: city.to_owned(),
            code: lookup.status.code.clone(),
        }),
    }
}

pub async fn current_conditions(
    provider: &dyn WeatherProvider,
    city: &str,
) -> Result<CurrentConditions, WeatherError> {
    let location_id = resolve_location(provider, city).await?;
    let payload = provider.current(&location_id).await?;
    ensure_success(&payload.status, "天气查询失败")?;

    Ok(CurrentConditions { city: city.to_owned(), fields: payload.now.unwrap_or_default() })
}

/// The upstream daily forecast entries, untouched.
pub async fn daily_forecast(
    provider: &dyn WeatherProvider,
    city: &str,
) -> Result<Vec<Value>, WeatherError> {
    let location_id = resolve_location(provider, city).await?;
    let payload = provider.forecast(&location_id).await?;
    ensure_success(&payload.status, "天气预报查询失败")?;

    Ok(payload.daily.unwrap_or_default())
}

/// One record per past day before `reference`, most recent first.
///
/// Only a failed location lookup is an error; per-day failures become
/// sentinel records.
pub async fn historical_weather<Tz: TimeZone>(
    provider: &dyn WeatherProvider,
    city: &str,
    reference: &DateTime<Tz>,
    days: u32,
) -> Result<Vec<DayAggregate>, WeatherError> {
    let location_id = resolve_location(provider, city).await?;
    let dates = past_dates(reference, days);

    let history = aggregate_days(provider, &location_id, &dates).await;

    let missing = history.iter().filter(|d| d.is_sentinel()).count();
    info!(city, %location_id, days = history.len(), missing, "historical weather aggregated");

    Ok(history)
}

/// Geocoding hits for autocomplete. An error status means no hits, not a failure.
pub async fn search_cities(
    provider: &dyn WeatherProvider,
    name: &str,
) -> Result<Vec<CityLocation>, WeatherError> {
    let lookup = provider.lookup_city(name).await?;

    if !lookup.status.is_success() {
        warn!(name, code = %lookup.status.code, "city lookup returned an error status");
        return Ok(Vec::new());
    }

    Ok(lookup.location.unwrap_or_default())
}

fn ensure_success(status: &ApiStatus, fallback: &str) -> Result<(), WeatherError> {
    if status.is_success() {
        return Ok(());
    }

    warn!(code = %status.code, message = status.message.as_deref().unwrap_or("-"), "QWeather error");
    Err(WeatherError::UpstreamStatus {
        code: status.code.clone(),
        message: status
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    })
}
