// Aggregation controller: concurrent read fetches merged into one view, plus actions.
// Overlapping refreshes are neither queued nor cancelled; each field is swapped whole.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::models::{ActionKind, ActionRequest, ActionResult, MetricSample, SystemStatus, ViewState};
use crate::remote::{ClientError, DashboardApi};

/// How overlapping refreshes resolve writes to the same field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Whichever fetch completes last wins, regardless of which refresh issued it.
    #[default]
    CompletionOrder,
    /// A write from an older refresh is dropped once a newer refresh has written that field.
    InvocationOrder,
}

/// Caller-visible result of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Failure(m) => m,
        }
    }
}

/// The action's trigger is disabled while a previous run of the same action is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is already in progress")]
pub struct ActionBusy(pub ActionKind);

#[derive(Debug, Clone, Copy)]
enum Field {
    Status = 0,
    Metrics = 1,
    Anomalies = 2,
}

enum FieldUpdate {
    Status(SystemStatus),
    Metrics(Vec<MetricSample>),
    Anomalies(Vec<MetricSample>),
}

impl FieldUpdate {
    fn field(&self) -> Field {
        match self {
            FieldUpdate::Status(_) => Field::Status,
            FieldUpdate::Metrics(_) => Field::Metrics,
            FieldUpdate::Anomalies(_) => Field::Anomalies,
        }
    }
}

/// Owner of the live view. Every mutation goes through `send_modify`/`send_if_modified`,
/// so readers never see a half-applied update. The counters below are only touched
/// inside those closures, i.e. under the channel's write lock.
struct ViewStore {
    tx: watch::Sender<ViewState>,
    in_flight: AtomicUsize,
    applied: [AtomicU64; 3],
}

impl ViewStore {
    fn new() -> Self {
        let (tx, _) = watch::channel(ViewState::default());
        Self {
            tx,
            in_flight: AtomicUsize::new(0),
            applied: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    fn begin(&self) {
        self.tx.send_modify(|view| {
            self.in_flight.fetch_add(1, Ordering::Relaxed);
            view.refreshing = true;
        });
    }

    fn finish(&self) {
        self.tx.send_modify(|view| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::Relaxed) - 1;
            view.refreshing = remaining > 0;
            view.loading = false;
        });
    }

    /// Single entry point for field writes. `generation` is `None` under completion-order.
    fn apply(&self, generation: Option<u64>, update: FieldUpdate) -> bool {
        let slot = &self.applied[update.field() as usize];
        self.tx.send_if_modified(|view| {
            if let Some(generation) = generation {
                if slot.load(Ordering::Relaxed) > generation {
                    return false;
                }
                slot.store(generation, Ordering::Relaxed);
            }
            match update {
                FieldUpdate::Status(status) => view.status = Some(status),
                FieldUpdate::Metrics(metrics) => view.metrics = Arc::from(metrics),
                FieldUpdate::Anomalies(anomalies) => view.anomalies = Arc::from(anomalies),
            }
            true
        })
    }
}

/// Held for the lifetime of one refresh; releases its `refreshing` share on drop,
/// including when the refresh future is dropped mid-flight.
struct RefreshGuard {
    store: Arc<ViewStore>,
    generation: u64,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.store.finish();
    }
}

/// Clears the action's busy flag on drop (success, failure or panic).
struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<ActionKind>>,
    kind: ActionKind,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.busy).remove(&self.kind);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AggregationController<A> {
    api: A,
    store: Arc<ViewStore>,
    policy: WritePolicy,
    next_generation: AtomicU64,
    busy: Mutex<HashSet<ActionKind>>,
}

impl<A: DashboardApi> AggregationController<A> {
    pub fn new(api: A, policy: WritePolicy) -> Self {
        Self {
            api,
            store: Arc::new(ViewStore::new()),
            policy,
            next_generation: AtomicU64::new(0),
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Read handle on the live view; `changed()` fires on every applied update.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.tx.subscribe()
    }

    /// Current view. Cheap: sequences are shared.
    pub fn snapshot(&self) -> ViewState {
        self.store.tx.borrow().clone()
    }

    /// Number of refreshes started since construction.
    pub fn refreshes_started(&self) -> u64 {
        self.next_generation.load(Ordering::Relaxed)
    }

    pub fn is_busy(&self, kind: ActionKind) -> bool {
        lock(&self.busy).contains(&kind)
    }

    /// Actions currently in flight, in a stable order.
    pub fn busy_actions(&self) -> Vec<ActionKind> {
        let mut kinds: Vec<ActionKind> = lock(&self.busy).iter().copied().collect();
        kinds.sort();
        kinds
    }

    fn begin_refresh(&self) -> RefreshGuard {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.store.begin();
        RefreshGuard {
            store: self.store.clone(),
            generation,
        }
    }

    /// Fetches status, metrics and anomalies concurrently and merges each on arrival.
    /// A failed fetch leaves its field untouched and is only logged.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) {
        let guard = self.begin_refresh();
        self.fetch_and_merge(guard.generation).await;
    }

    /// Like `refresh_all`, but the refresh is registered (and `refreshing` set) before
    /// this returns; the fetches run on a spawned task.
    pub fn spawn_refresh(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let guard = self.begin_refresh();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.fetch_and_merge(guard.generation).await;
            drop(guard);
        })
    }

    async fn fetch_and_merge(&self, generation: u64) {
        let generation = match self.policy {
            WritePolicy::CompletionOrder => None,
            WritePolicy::InvocationOrder => Some(generation),
        };

        let status = async {
            match self.api.fetch_status().await {
                Ok(status) => {
                    self.store.apply(generation, FieldUpdate::Status(status));
                }
                Err(e) => warn!(
                    error = %e,
                    operation = "fetch_status",
                    "status refresh failed; keeping previous value"
                ),
            }
        };
        let metrics = async {
            match self.api.fetch_metrics().await {
                Ok(metrics) => {
                    self.store.apply(generation, FieldUpdate::Metrics(metrics));
                }
                Err(e) => warn!(
                    error = %e,
                    operation = "fetch_metrics",
                    "metrics refresh failed; keeping previous value"
                ),
            }
        };
        let anomalies = async {
            match self.api.fetch_anomalies().await {
                Ok(anomalies) => {
                    self.store.apply(generation, FieldUpdate::Anomalies(anomalies));
                }
                Err(e) => warn!(
                    error = %e,
                    operation = "fetch_anomalies",
                    "anomalies refresh failed; keeping previous value"
                ),
            }
        };

        tokio::join!(status, metrics, anomalies);
    }

    /// Runs the action, then refreshes the view once if it succeeded.
    /// Fails only when the same action is already in flight.
    #[instrument(skip(self), fields(action = %request.kind()))]
    pub async fn perform_and_refresh(&self, request: ActionRequest) -> Result<Notice, ActionBusy> {
        let kind = request.kind();
        let busy = self.acquire(kind)?;
        let notice = match self.api.perform_action(request).await {
            Ok(result) => Notice::Success(success_message(kind, &result)),
            Err(e) => {
                warn!(error = %e, operation = "perform_action", "action failed");
                Notice::Failure(failure_message(kind, &e))
            }
        };
        drop(busy);

        if notice.is_success() {
            info!(notice = notice.message(), "action succeeded");
            self.refresh_all().await;
        }
        Ok(notice)
    }

    fn acquire(&self, kind: ActionKind) -> Result<BusyGuard<'_>, ActionBusy> {
        if !lock(&self.busy).insert(kind) {
            return Err(ActionBusy(kind));
        }
        Ok(BusyGuard {
            busy: &self.busy,
            kind,
        })
    }
}

pub fn success_message(kind: ActionKind, result: &ActionResult) -> String {
    match kind {
        ActionKind::Collect | ActionKind::Train => result
            .message
            .clone()
            .unwrap_or_else(|| format!("{kind} complete")),
        ActionKind::Detect => format!("Found {} anomalies", result.anomalies_found.unwrap_or(0)),
        ActionKind::Clear => "All data cleared".to_string(),
    }
}

pub fn failure_message(kind: ActionKind, error: &ClientError) -> String {
    let reason = match error {
        ClientError::Service { message: Some(m) } => m.clone(),
        ClientError::Service { message: None } => format!("{kind} failed"),
        other => other.to_string(),
    };
    format!("Failed to {kind}: {reason}")
}
