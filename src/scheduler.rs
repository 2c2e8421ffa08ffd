// Periodic refresh: fires the controller's refresh now and then every interval until stopped.
// Fired refreshes run on their own tasks, so a slow service never delays the next tick
// and stopping never cancels a refresh already in flight.

use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::Instrument;

use crate::controller::AggregationController;
use crate::remote::DashboardApi;

/// One timer per mounted dashboard. `stop` must be awaited on teardown.
pub struct Scheduler {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl Scheduler {
    pub fn start<A: DashboardApi>(controller: Arc<AggregationController<A>>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let span = tracing::span!(
            tracing::Level::DEBUG,
            "scheduler",
            period_ms = period.as_millis() as u64
        );
        let task = async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Scheduler shutting down");
                        break;
                    }
                    _ = tick.tick() => {
                        tracing::debug!(operation = "refresh_all", "scheduled refresh");
                        drop(controller.spawn_refresh());
                    }
                }
            }
        };
        let handle = tokio::spawn(task.instrument(span));
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels future ticks and waits for the timer task to exit. Idempotent.
    /// Once this returns no further refresh is started by this scheduler.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "scheduler task ended abnormally");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
