use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use super::auth;
use super::handlers;
use super::state::AppState;

const HSTS: &str = "max-age=1024000; includeSubDomains";

// Liveness probe, kept outside the API layers
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::api::health))
}

// API Routes - REST API for programmatic access
pub fn api_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let max_in_flight = state.config.web.max_concurrent_requests.max(1);

    // Token check runs before a request waits for a pipeline slot
    let bot_routes = Router::new()
        .route("/query", post(handlers::api::query))
        .route_layer(ConcurrencyLimitLayer::new(max_in_flight))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(state),
            auth::verify_token,
        ));

    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .nest("/bot", bot_routes)
                // System status
                .route("/status", get(handlers::api::system_status)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        ))
}
