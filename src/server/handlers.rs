//! API endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::models::RunOptions;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Overrides accepted by the start endpoint; anything omitted falls back
/// to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct StartRunRequest {
    pub range: Option<String>,
    pub mirror_to_sink: Option<bool>,
    pub max_records: Option<u32>,
    pub description: Option<String>,
}

/// Parameters for the run listing.
#[derive(Debug, Deserialize)]
pub struct RunListParams {
    pub limit: Option<i64>,
}

/// Start a research run; returns the run id immediately.
pub async fn start_run(
    State(state): State<AppState>,
    body: Option<Json<StartRunRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(r)| r).unwrap_or_default();

    let options = RunOptions {
        source_range: req.range.unwrap_or_else(|| state.defaults.source_range.clone()),
        mirror_to_sink: req.mirror_to_sink.unwrap_or(state.defaults.mirror_to_sink),
        max_records: req.max_records.or(state.defaults.max_records),
        description: req.description.unwrap_or_default(),
    };

    match state.service.start(options).await {
        Ok(run) => (StatusCode::ACCEPTED, Json(run)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Read one run's status.
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    match state.service.runs().get(&run_id).await {
        Ok(Some(run)) => Json(run).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "run not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// List recent runs, newest first.
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<RunListParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    match state.service.runs().recent(limit).await {
        Ok(runs) => Json(runs).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Read one reconciled company with its owned collections.
pub async fn get_company(
    State(state): State<AppState>,
    Path(corporate_number): Path<String>,
) -> impl IntoResponse {
    let companies = state.service.companies();

    let company = match companies.get(&corporate_number).await {
        Ok(Some(company)) => company,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "company not found" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let roster = companies
        .get_roster(&corporate_number)
        .await
        .unwrap_or_default();
    let locations = companies
        .get_locations(&corporate_number)
        .await
        .unwrap_or_default();

    Json(json!({
        "company": company,
        "roster": roster,
        "locations": locations,
    }))
    .into_response()
}
