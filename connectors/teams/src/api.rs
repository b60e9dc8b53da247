use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::utils::truncate_with_ellipsis;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipeline::MeetingSummaryPipeline;

/// Longest reply sent back through the chat channel.
pub const MAX_REPLY_CHARS: usize = 4000;

pub const HELP_MESSAGE: &str =
    "Send 'summary' or 'summarize' to get meeting summaries for the last configured days.";
pub const SHORT_HELP_MESSAGE: &str = "Send 'summary' or 'summarize' to get meeting summaries.";
pub const MISSING_ORGANIZER_MESSAGE: &str = "Meeting organizer user ID is not configured (MEETING_ORGANIZER_USER_ID). \
Please set it in configuration to fetch your meeting transcripts.";

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<MeetingSummaryPipeline>,
    pub organizer_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub text: String,
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", post(handle_message))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "teams-connector"
    }))
}

async fn handle_message(
    State(state): State<ApiState>,
    Json(request): Json<MessageRequest>,
) -> Json<MessageResponse> {
    let text = request.text.unwrap_or_default();
    let reply = reply_to_message(&state, &text).await;
    Json(MessageResponse { text: reply })
}

/// Routes one chat message: summary requests run the pipeline, anything else gets help.
pub async fn reply_to_message(state: &ApiState, text: &str) -> String {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return HELP_MESSAGE.to_string();
    }

    if !(text.contains("summary") || text.contains("summarize")) {
        return SHORT_HELP_MESSAGE.to_string();
    }

    let Some(user_id) = state.organizer_user_id.as_deref() else {
        return MISSING_ORGANIZER_MESSAGE.to_string();
    };

    info!("Summary requested for organizer {}", user_id);
    let summary = state.pipeline.summarize_for_user(user_id).await;
    truncate_with_ellipsis(&summary, MAX_REPLY_CHARS)
}
