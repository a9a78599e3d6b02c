use thiserror::Error;

/// Failure to get a parseable JSON body out of the upstream.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to QWeather {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("QWeather {endpoint} returned an unreadable body (HTTP {status}, {reason}): {body}")]
    InvalidBody { endpoint: &'static str, status: u16, reason: String, body: String },
}

/// Errors surfaced by the weather services to their callers.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Location lookup gave no usable identifier. Nothing else can run without one.
    #[error("city '{query}' not found, or unexpected lookup response (code={code})")]
    CityNotFound { query: String, code: String },

    /// The upstream answered with JSON but its embedded status code is not success.
    #[error("{message}")]
    UpstreamStatus { code: String, message: String },
}
