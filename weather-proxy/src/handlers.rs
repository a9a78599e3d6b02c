//! Route handlers. Each validates its query parameter before anything
//! touches the upstream, then defers to `weather_core::service`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use weather_core::{CurrentConditions, DayAggregate, service};

use crate::error::ApiError;
use crate::state::AppState;

const MISSING_CITY: &str = "缺少城市参数";
const MISSING_NAME: &str = "缺少城市名参数";

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    value.filter(|v| !v.is_empty()).ok_or(ApiError::MissingParameter(message))
}

/// `GET /api/weather`
pub async fn current_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<CurrentConditions>, ApiError> {
    let city = required(query.city, MISSING_CITY)?;
    let current = service::current_conditions(state.provider.as_ref(), &city).await?;
    Ok(Json(current))
}

/// `GET /api/weather/forecast`
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let city = required(query.city, MISSING_CITY)?;
    let daily = service::daily_forecast(state.provider.as_ref(), &city).await?;
    Ok(Json(daily))
}

/// `GET /api/weather/history`
///
/// Always answers with `history_days` records once the city resolves;
/// days the upstream could not serve come back as sentinel records.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<DayAggregate>>, ApiError> {
    let city = required(query.city, MISSING_CITY)?;
    let now = Local::now();
    let days =
        service::historical_weather(state.provider.as_ref(), &city, &now, state.history_days)
            .await?;
    Ok(Json(days))
}

/// `GET /api/city`
pub async fn city_lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = required(query.name, MISSING_NAME)?;
    let locations = service::search_cities(state.provider.as_ref(), &name).await?;
    Ok(Json(json!({ "location": locations })))
}
