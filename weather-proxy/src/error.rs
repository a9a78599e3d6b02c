//! Maps service failures onto HTTP status codes and `{error}` bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use weather_core::WeatherError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required query parameter was absent or empty. Carries the message sent back.
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingParameter(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Weather(WeatherError::UpstreamStatus { code, message }) => {
                error!(%code, %message, "QWeather reported an error");
                (StatusCode::BAD_GATEWAY, json!({ "error": message, "code": code }))
            }
            Self::Weather(e) => {
                error!(error = %e, "proxy request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
            }
        };

        (status, Json(body)).into_response()
    }
}
