//! HTTP front end for the QWeather proxy.
//!
//! Exposes four JSON routes backed by `weather-core`:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/weather?city=` | Current conditions |
//! | `GET` | `/api/weather/forecast?city=` | Daily forecast, passed through |
//! | `GET` | `/api/weather/history?city=` | Past days aggregated from hourly data |
//! | `GET` | `/api/city?name=` | City autocomplete |

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
