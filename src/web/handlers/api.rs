use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::bot::answer_question;
use crate::bot::models::QueryRequest;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub retrieval_enabled: bool,
    pub llm_backend: String,
    pub llm_model: String,
}

// Natural language to SQL
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Response {
    match answer_question(&state.bot, &payload.question).await {
        Ok(outcome) if outcome.is_success() => {
            info!("Answered in {:.3}s", outcome.response.time_taken);
            (StatusCode::OK, Json(outcome.response)).into_response()
        }
        Ok(outcome) => {
            warn!("Post-processing failed: {:?}", outcome.status);
            (StatusCode::BAD_REQUEST, Json(outcome.response)).into_response()
        }
        Err(e) => {
            error!("Failed to answer question: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        retrieval_enabled: state.bot.retriever.is_enabled(),
        llm_backend: state.bot.llm.backend().to_string(),
        llm_model: state.bot.llm.model().to_string(),
    })
}
