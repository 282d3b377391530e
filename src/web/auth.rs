use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

pub const TOKEN_HEADER: &str = "x-token";

/// Rejects requests whose `X-Token` header differs from the configured service token.
/// Passes everything through when no token is configured.
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.config.auth.service_token.as_deref() {
        let provided = request
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        if provided != Some(expected) {
            warn!("Rejected {} {}: invalid X-Token header", request.method(), request.uri());
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Invalid X-Token header" })),
            )
                .into_response();
        }
    }

    next.run(request).await
}
