// Counter board: follows the live view and animates the record/anomaly counters
// whenever their underlying numbers change.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::counter::CounterAnimator;
use crate::models::ViewState;

/// Displayed counter values at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterValues {
    pub records: u64,
    pub anomalies: u64,
}

/// Read side of the counters; the driving task ends when the view channel closes.
pub struct CounterBoard {
    records: watch::Receiver<u64>,
    anomalies: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl CounterBoard {
    pub fn spawn(mut view_rx: watch::Receiver<ViewState>, tick: Duration) -> Self {
        let mut records = CounterAnimator::new(tick);
        let mut anomalies = CounterAnimator::new(tick);
        let records_rx = records.subscribe();
        let anomalies_rx = anomalies.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                let (total, found) = {
                    let view = view_rx.borrow_and_update();
                    (view.total_records(), view.anomaly_count())
                };
                if records.target() != Some(total) {
                    records.animate_to(total);
                }
                if anomalies.target() != Some(found) {
                    anomalies.animate_to(found);
                }
                if view_rx.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Counter board shutting down");
        });

        Self {
            records: records_rx,
            anomalies: anomalies_rx,
            handle,
        }
    }

    pub fn values(&self) -> CounterValues {
        CounterValues {
            records: *self.records.borrow(),
            anomalies: *self.anomalies.borrow(),
        }
    }

    pub fn records(&self) -> watch::Receiver<u64> {
        self.records.clone()
    }

    pub fn anomalies(&self) -> watch::Receiver<u64> {
        self.anomalies.clone()
    }
}

impl Drop for CounterBoard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
