// Animated counters: a lazy step sequence toward a target, and a timed driver for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Number of increments a full animation is split into.
pub const COUNTER_STEPS: u64 = 30;

/// Default tick period of the timed driver.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// Yields 0, then multiples of `ceil(target / 30)` below `target`, then exactly `target`.
/// For a target of 0 the sequence is just `[0]`.
#[derive(Debug, Clone)]
pub struct CounterSteps {
    target: u64,
    step: u64,
    next: Option<u64>,
}

pub fn counter_steps(target: u64) -> CounterSteps {
    CounterSteps {
        target,
        step: target.div_ceil(COUNTER_STEPS).max(1),
        next: Some(0),
    }
}

impl CounterSteps {
    pub fn target(&self) -> u64 {
        self.target
    }
}

impl Iterator for CounterSteps {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = if current >= self.target {
            None
        } else {
            Some(current.saturating_add(self.step).min(self.target))
        };
        Some(current)
    }
}

/// Publishes a `CounterSteps` sequence on a watch channel, one value per tick.
/// Retargeting aborts the running sequence and starts again from 0.
pub struct CounterAnimator {
    tick: Duration,
    tx: Arc<watch::Sender<u64>>,
    run: Arc<AtomicU64>,
    target: Option<u64>,
    task: Option<JoinHandle<()>>,
}

impl CounterAnimator {
    pub fn new(tick: Duration) -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            tick,
            tx: Arc::new(tx),
            run: Arc::new(AtomicU64::new(0)),
            target: None,
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Currently displayed value.
    pub fn value(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Last requested target, if any.
    pub fn target(&self) -> Option<u64> {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn animate_to(&mut self, target: u64) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.target = Some(target);
        // A sequence aborted mid-poll may still try one write; the run id fences it off.
        let run_id = self.run.fetch_add(1, Ordering::SeqCst) + 1;
        let run = self.run.clone();
        let tx = self.tx.clone();
        let tick = self.tick;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            for value in counter_steps(target) {
                interval.tick().await;
                let current = tx.send_if_modified(|shown| {
                    if run.load(Ordering::SeqCst) != run_id {
                        return false;
                    }
                    *shown = value;
                    true
                });
                if !current {
                    break;
                }
            }
        }));
    }

    /// Waits for the running sequence, if any, to reach its target.
    pub async fn settle(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CounterAnimator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
