//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use jobrec_core::{RecommendRequest, RecommendResponse, StatusMessage};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Liveness message
pub async fn home() -> Json<StatusMessage> {
    metrics::counter!("jobrec_requests_total", "endpoint" => "home").increment(1);
    Json(StatusMessage::running())
}

/// Rank every job category for a profile and job description
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    metrics::counter!("jobrec_requests_total", "endpoint" => "recommend").increment(1);

    let Json(request) = payload?;
    debug!(
        profile_len = request.user_profile.len(),
        job_len = request.job_description.len(),
        "Classifying recommendation request"
    );

    let recommendations = state
        .recommender
        .classify(&request.user_profile, &request.job_description)
        .await?;

    Ok(Json(RecommendResponse { recommendations }))
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

pub async fn fallback(uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri);
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "message": format!("Not found: {}", uri.path()),
                "type": "not_found"
            }
        })),
    )
}
