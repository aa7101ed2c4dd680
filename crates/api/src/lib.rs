//! ServiLog API Server
//!
//! REST API for accounts, vehicles, parts and mileage readings, with
//! maintenance status checks after every write that can change them.

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use state::{AppState, SharedState};

use config::LogConfig;
use response::ApiResponse;

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    let router = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .nest("/account", routes::account::router(&state.settings.rate_limit))
        .nest("/vehicle", routes::vehicle::router())
        .nest("/part", routes::part::router())
        .nest("/mileage", routes::mileage::router())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.settings.server.frontend_url) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    middleware::security_headers(router).with_state(state)
}

async fn route_not_found() -> ApiResponse<()> {
    ApiResponse::failure(StatusCode::NOT_FOUND, "Route not found")
}

async fn method_not_allowed() -> ApiResponse<()> {
    ApiResponse::failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// CORS restricted to the web client's origin
fn cors_layer(frontend_url: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => origin,
        Err(e) => {
            warn!("CORS disabled: invalid frontend url {:?}: {}", frontend_url, e);
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

/// Initialize logging; `RUST_LOG` overrides the default `info` filter
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
