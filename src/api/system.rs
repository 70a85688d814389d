use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse, PlatformDto};

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = match &state.shared.database {
        Some(db) => Some(db.ping().await.is_ok()),
        None => None,
    };

    let healthy = database.unwrap_or(true);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        })),
    )
        .into_response()
}

/// `GET /api/platforms`
///
/// Configured platforms first, in config order, then any registered provider
/// the config does not list. Disabled platforms are reported as coming soon.
pub async fn list_platforms(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<PlatformDto>>> {
    let platforms = state.config().read().await.providers.platforms.clone();
    let registry = &state.shared.registry;
    let statuses = state.shared.provider_status.snapshot().await;
    let stats = |name: &str| statuses.get(name).cloned().unwrap_or_default();

    let mut dtos: Vec<PlatformDto> = platforms
        .iter()
        .map(|p| {
            let active = registry.find(&p.name).is_some();
            PlatformDto::new(&p.name, Some(p.domain.as_str()), active, &stats(&p.name))
        })
        .collect();

    for name in registry.names() {
        if !platforms.iter().any(|p| p.name.eq_ignore_ascii_case(&name)) {
            dtos.push(PlatformDto::new(&name, None, true, &stats(&name)));
        }
    }

    Json(ApiResponse::success(dtos))
}

/// `GET /api/metrics`
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}
