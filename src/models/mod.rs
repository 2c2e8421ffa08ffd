// Domain models: service payloads, actions and the merged view

mod action;
mod metric;
mod status;
mod view;

pub use action::{ActionKind, ActionRequest, ActionResult, UnknownAction};
pub use metric::{
    CHART_WINDOW, HIGH_USAGE_THRESHOLD, MetricAverages, MetricSample, Severity,
    WARNING_USAGE_THRESHOLD, recent_window,
};
pub use status::{ServiceHealth, SystemStatus};
pub use view::ViewState;
