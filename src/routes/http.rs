// HTTP handlers: version, dashboard snapshot, refresh and action triggers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;
use crate::dashboard::CounterValues;
use crate::models::{
    ActionKind, ActionRequest, CHART_WINDOW, MetricAverages, MetricSample, ViewState,
    recent_window,
};
use crate::remote::DashboardApi;
use crate::version::{NAME, VERSION};

/// Everything the page needs in one response.
#[derive(Debug, Serialize)]
pub(super) struct DashboardResponse {
    view: ViewState,
    busy: Vec<ActionKind>,
    counters: CounterValues,
    averages: MetricAverages,
    recent: Vec<MetricSample>,
    healthy: bool,
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard: current view plus derived chart data and busy flags.
pub(super) async fn dashboard_handler<A: DashboardApi>(
    State(state): State<AppState<A>>,
) -> impl IntoResponse {
    let view = state.controller.snapshot();
    let averages = MetricAverages::from_samples(&view.metrics);
    let recent = recent_window(&view.metrics, CHART_WINDOW).to_vec();
    let healthy = view.status.as_ref().is_some_and(|s| s.status.is_healthy());
    Json(DashboardResponse {
        busy: state.controller.busy_actions(),
        counters: state.counters.values(),
        averages,
        recent,
        healthy,
        view,
    })
}

/// POST /api/refresh: fires one refresh and returns without waiting for it.
pub(super) async fn refresh_handler<A: DashboardApi>(
    State(state): State<AppState<A>>,
) -> impl IntoResponse {
    drop(state.controller.spawn_refresh());
    StatusCode::ACCEPTED
}

/// POST /api/actions/{action}: runs collect/train/detect/clear, then refreshes on success.
pub(super) async fn action_handler<A: DashboardApi>(
    State(state): State<AppState<A>>,
    Path(action): Path<String>,
) -> Response {
    let kind = match action.parse::<ActionKind>() {
        Ok(kind) => kind,
        Err(e) => return failure(StatusCode::NOT_FOUND, e.to_string()),
    };
    let request = ActionRequest::for_kind(kind, state.config.actions.num_collections());
    match state.controller.perform_and_refresh(request).await {
        Ok(notice) => Json(notice).into_response(),
        Err(busy) => failure(StatusCode::CONFLICT, busy.to_string()),
    }
}

fn failure(code: StatusCode, message: String) -> Response {
    (
        code,
        Json(serde_json::json!({ "outcome": "failure", "message": message })),
    )
        .into_response()
}
