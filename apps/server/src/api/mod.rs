use std::sync::Arc;

use axum::http::{header::HeaderName, HeaderMap, HeaderValue, Method};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, main_lib::AppState};

mod brands;
mod calculator;
mod currency;
mod health;
mod history;
mod market;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// The anonymous device identity, when the client sent one.
pub fn device_id_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([
                HeaderName::from_static("content-type"),
                HeaderName::from_static(DEVICE_ID_HEADER),
            ])
    };

    let api = Router::new()
        .merge(calculator::router())
        .merge(currency::router())
        .merge(market::router())
        .merge(brands::router())
        .merge(history::router());

    Router::new()
        .nest("/api", api)
        .merge(health::router())
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
