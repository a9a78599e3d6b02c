use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the proxy router.
///
/// CORS allows any origin: the UI is served from its own dev server.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/weather", get(handlers::current_weather))
        .route("/api/weather/forecast", get(handlers::forecast))
        .route("/api/weather/history", get(handlers::history))
        .route("/api/city", get(handlers::city_lookup))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
