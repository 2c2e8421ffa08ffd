// Shared test helpers: a scriptable in-memory service and an in-process HTTP mock

#![allow(dead_code)]

use sentinel_dashboard::models::*;
use sentinel_dashboard::remote::{ClientError, DashboardApi};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};

pub fn status(total_records: u64) -> SystemStatus {
    SystemStatus {
        status: ServiceHealth::Healthy,
        total_records,
        model_trained: false,
        data_collected: None,
        model_file_exists: None,
        simulation_mode: None,
        timestamp: None,
    }
}

pub fn sample(instance_id: &str, cpu_usage: f64) -> MetricSample {
    MetricSample {
        timestamp: "2026-10-17 12:00:00".into(),
        instance_id: instance_id.into(),
        cpu_usage,
        memory_usage: 50.0,
        network_traffic: 10.0,
        anomaly: None,
        anomaly_score: None,
    }
}

struct Step<T> {
    result: Result<T, ClientError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Queue of scripted answers for one operation; falls back to `default` when empty.
pub struct Script<T> {
    steps: Mutex<VecDeque<Step<T>>>,
    default: Mutex<Result<T, ClientError>>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl<T: Clone> Script<T> {
    fn new(default: Result<T, ClientError>) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            default: Mutex::new(default),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn set_default(&self, result: Result<T, ClientError>) {
        *self.default.lock().unwrap() = result;
    }

    pub fn push(&self, result: Result<T, ClientError>) {
        self.steps.lock().unwrap().push_back(Step { result, gate: None });
    }

    /// The call answering with `result` blocks until the returned sender fires (or drops).
    pub fn push_gated(&self, result: Result<T, ClientError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().unwrap().push_back(Step {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    async fn call(&self) -> Result<T, ClientError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        let result = match step {
            Some(Step { result, gate }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => self.default.lock().unwrap().clone(),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

pub struct FakeApi {
    pub status: Script<SystemStatus>,
    pub metrics: Script<Vec<MetricSample>>,
    pub anomalies: Script<Vec<MetricSample>>,
    pub action: Script<ActionResult>,
    pub requests: Mutex<Vec<ActionRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            status: Script::new(Ok(status(0))),
            metrics: Script::new(Ok(vec![])),
            anomalies: Script::new(Ok(vec![])),
            action: Script::new(Ok(ActionResult::default())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every read endpoint fails with a network error by default.
    pub fn unreachable() -> Self {
        let api = Self::new();
        let down = || ClientError::Network("connection refused".into());
        api.status.set_default(Err(down()));
        api.metrics.set_default(Err(down()));
        api.anomalies.set_default(Err(down()));
        api.action.set_default(Err(down()));
        api
    }
}

impl DashboardApi for FakeApi {
    async fn fetch_status(&self) -> Result<SystemStatus, ClientError> {
        self.status.call().await
    }

    async fn fetch_metrics(&self) -> Result<Vec<MetricSample>, ClientError> {
        self.metrics.call().await
    }

    async fn fetch_anomalies(&self) -> Result<Vec<MetricSample>, ClientError> {
        self.anomalies.call().await
    }

    async fn perform_action(&self, request: ActionRequest) -> Result<ActionResult, ClientError> {
        self.requests.lock().unwrap().push(request);
        self.action.call().await
    }
}

/// Polls `cond` every millisecond until it holds; panics after two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for condition");
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Serves `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_service(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}
