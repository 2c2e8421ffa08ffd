// HTTP + WebSocket surface over the live dashboard view

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::controller::AggregationController;
use crate::dashboard::CounterBoard;
use crate::remote::DashboardApi;

pub(crate) struct AppState<A> {
    pub(crate) controller: Arc<AggregationController<A>>,
    pub(crate) counters: Arc<CounterBoard>,
    pub(crate) config: AppConfig,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            counters: self.counters.clone(),
            config: self.config.clone(),
        }
    }
}

pub fn app<A: DashboardApi>(
    controller: Arc<AggregationController<A>>,
    counters: Arc<CounterBoard>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        controller,
        counters,
        config,
    };
    Router::new()
        .route("/", get(|| async { "Sentinel dashboard" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler::<A>)) // GET /api/dashboard
        .route("/api/refresh", post(http::refresh_handler::<A>)) // POST /api/refresh
        .route("/api/actions/{action}", post(http::action_handler::<A>)) // POST /api/actions/:action
        .route("/ws/dashboard", get(ws::ws_dashboard::<A>)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
