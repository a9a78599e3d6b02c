use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Config, error::ProviderError};

use super::{CityLookup, ForecastPayload, HistoricalPayload, NowPayload, WeatherProvider};

const USER_AGENT: &str = concat!("weather-proxy/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the QWeather (和风天气) API.
#[derive(Debug, Clone)]
pub struct QWeatherProvider {
    api_key: String,
    api_host: String,
    lang: String,
    http: Client,
}

impl QWeatherProvider {
    /// Fails when the config has no API key or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_owned();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client for QWeather")?;

        Ok(Self {
            api_key,
            api_host: config.api_host().to_owned(),
            lang: config.lang().to_owned(),
            http,
        })
    }

    /// GET `path` and parse the body as JSON whatever the HTTP status is;
    /// QWeather reports its own status inside the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.api_host, path);
        debug!(endpoint, %url, "QWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidBody {
            endpoint,
            status: status.as_u16(),
            reason: e.to_string(),
            body: truncate_body(&body),
        })
    }
}

#[async_trait]
impl WeatherProvider for QWeatherProvider {
    async fn lookup_city(&self, query: &str) -> Result<CityLookup, ProviderError> {
        self.get_json("city lookup", "/geo/v2/city/lookup", &[("location", query)]).await
    }

    async fn current(&self, location_id: &str) -> Result<NowPayload, ProviderError> {
        self.get_json(
            "current weather",
            "/v7/weather/now",
            &[("location", location_id), ("lang", self.lang.as_str())],
        )
        .await
    }

    async fn forecast(&self, location_id: &str) -> Result<ForecastPayload, ProviderError> {
        self.get_json(
            "7-day forecast",
            "/v7/weather/7d",
            &[("location", location_id), ("lang", self.lang.as_str())],
        )
        .await
    }

    async fn historical(
        &self,
        location_id: &str,
        date: &str,
    ) -> Result<HistoricalPayload, ProviderError> {
        self.get_json(
            "historical weather",
            "/v7/historical/weather",
            &[
                ("location", location_id),
                ("date", date),
                ("lang", self.lang.as_str()),
                ("unit", "m"),
            ],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
