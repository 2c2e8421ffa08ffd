// The merged dashboard snapshot

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{MetricSample, SystemStatus};

/// Merged view of the three read endpoints plus the fetch-cycle flags.
/// Sequences are shared slices: a field update swaps the whole `Arc`, never edits in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: Option<SystemStatus>,
    pub metrics: Arc<[MetricSample]>,
    pub anomalies: Arc<[MetricSample]>,
    pub loading: bool,
    pub refreshing: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: None,
            metrics: Arc::from(Vec::new()),
            anomalies: Arc::from(Vec::new()),
            loading: true,
            refreshing: false,
        }
    }
}

impl ViewState {
    /// Total records reported by the service, 0 before the first status arrives.
    pub fn total_records(&self) -> u64 {
        self.status.as_ref().map_or(0, |s| s.total_records)
    }

    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.len() as u64
    }

    pub fn model_trained(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.model_trained)
    }
}
