// Service status as reported by GET /status

use serde::{Deserialize, Serialize};

/// Health label reported by the service; serializes to lowercase JSON (e.g. "healthy").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    Healthy,
    Warning,
    Success,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServiceHealth {
    /// Only an explicit "healthy" counts; everything else is shown as a warning.
    pub fn is_healthy(self) -> bool {
        self == ServiceHealth::Healthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub status: ServiceHealth,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub model_trained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_collected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_file_exists: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_mode: Option<bool>,
    /// Service wall-clock time of the status report ("%Y-%m-%d %H:%M:%S").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
