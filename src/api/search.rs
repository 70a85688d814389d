use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{ApiError, ApiResponse, AppState, JobDto, SearchHistoryDto};
use crate::models::SearchQuery;

const DEFAULT_HISTORY_LIMIT: u64 = 10;
const MAX_HISTORY_LIMIT: u64 = 100;

/// `POST /api/search`
pub async fn search_jobs(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<JobDto>>>, ApiError> {
    info!(
        title = %query.title(),
        location = %query.location(),
        platform = %query.platform(),
        "Search requested"
    );

    let jobs = state.search_service().search(&query).await?;
    let dtos = jobs.into_iter().map(JobDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u64>,
}

/// `GET /api/search/history`
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<Vec<SearchHistoryDto>>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let history = state.search_service().recent_searches(limit).await?;
    let dtos = history.into_iter().map(SearchHistoryDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}
