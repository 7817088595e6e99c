use super::state::AppState;
use crate::recording::TimingEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /events
/// Queue a timing event for the recorder
pub async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<TimingEvent>,
) -> impl IntoResponse {
    debug!("Received event: {:?}", event);

    match state.events.send(event).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            error!("Recorder is not accepting events: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Recorder is not running".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /status
/// Latest status update, or 204 before the first one
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.status.latest() {
        Some(update) => (StatusCode::OK, Json(update)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
