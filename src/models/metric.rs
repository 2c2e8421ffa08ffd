// Metric samples and the derived summaries shown next to the charts

use serde::{Deserialize, Serialize};

/// Usage above this is highlighted as high.
pub const HIGH_USAGE_THRESHOLD: f64 = 80.0;
/// Usage above this (and not high) is highlighted as a warning.
pub const WARNING_USAGE_THRESHOLD: f64 = 60.0;
/// Number of trailing samples plotted in the usage charts.
pub const CHART_WINDOW: usize = 12;

/// One row of collected metrics. Anomaly rows carry the detector columns as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: String,
    pub instance_id: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub network_traffic: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    High,
}

impl Severity {
    pub fn of(value: f64) -> Self {
        if value > HIGH_USAGE_THRESHOLD {
            Severity::High
        } else if value > WARNING_USAGE_THRESHOLD {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

impl MetricSample {
    pub fn cpu_severity(&self) -> Severity {
        Severity::of(self.cpu_usage)
    }

    pub fn memory_severity(&self) -> Severity {
        Severity::of(self.memory_usage)
    }
}

/// Column means, rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub cpu: f64,
    pub memory: f64,
    pub network: f64,
}

impl MetricAverages {
    /// All zero for an empty slice.
    pub fn from_samples(samples: &[MetricSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let (cpu, memory, network) = samples.iter().fold((0.0, 0.0, 0.0), |acc, s| {
            (
                acc.0 + s.cpu_usage,
                acc.1 + s.memory_usage,
                acc.2 + s.network_traffic,
            )
        });
        Self {
            cpu: round2(cpu / n),
            memory: round2(memory / n),
            network: round2(network / n),
        }
    }
}

/// The last `n` samples in service order.
pub fn recent_window(samples: &[MetricSample], n: usize) -> &[MetricSample] {
    &samples[samples.len().saturating_sub(n)..]
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
