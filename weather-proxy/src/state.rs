use std::sync::Arc;

use weather_core::WeatherProvider;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    /// Number of past days `/api/weather/history` returns.
    pub history_days: u32,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>, history_days: u32) -> Self {
        Self { provider, history_days }
    }
}
