// Counter animator and the counter board that follows the live view

mod common;

use common::{FakeApi, sample, status, wait_until};
use sentinel_dashboard::controller::{AggregationController, WritePolicy};
use sentinel_dashboard::counter::{CounterAnimator, counter_steps};
use sentinel_dashboard::dashboard::{CounterBoard, CounterValues};
use tokio::time::{Duration, sleep};

#[tokio::test]
async fn animate_to_zero_shows_zero() {
    let mut animator = CounterAnimator::new(Duration::from_millis(1));
    animator.animate_to(0);
    animator.settle().await;
    assert_eq!(animator.value(), 0);
    assert_eq!(animator.target(), Some(0));
}

#[tokio::test]
async fn animate_to_reaches_target_monotonically() {
    let mut animator = CounterAnimator::new(Duration::from_millis(1));
    let mut rx = animator.subscribe();
    animator.animate_to(100);

    let mut last = 0;
    loop {
        rx.changed().await.unwrap();
        let v = *rx.borrow_and_update();
        assert!(v >= last, "value went backwards: {last} -> {v}");
        assert!(v <= 100, "overshoot: {v}");
        last = v;
        if v == 100 {
            break;
        }
    }
    animator.settle().await;
    assert_eq!(animator.value(), 100);
    assert!(!animator.is_running());
}

#[tokio::test]
async fn retarget_restarts_from_zero() {
    let mut animator = CounterAnimator::new(Duration::from_millis(5));
    animator.animate_to(100);
    wait_until(|| animator.value() >= 8).await;
    assert!(animator.value() < 100);

    let mut rx = animator.subscribe();
    animator.animate_to(50);
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 0);

    animator.settle().await;
    assert_eq!(animator.value(), 50);
}

#[tokio::test]
async fn published_values_come_from_the_step_sequence() {
    let mut animator = CounterAnimator::new(Duration::from_millis(1));
    let mut rx = animator.subscribe();
    let expected: Vec<u64> = counter_steps(60).collect();
    animator.animate_to(60);

    // the watch channel may coalesce ticks, but never invents values
    loop {
        rx.changed().await.unwrap();
        let v = *rx.borrow_and_update();
        assert!(expected.contains(&v), "unexpected value {v}");
        if v == 60 {
            break;
        }
    }
}

#[tokio::test]
async fn dropping_animator_stops_ticking() {
    let mut animator = CounterAnimator::new(Duration::from_millis(5));
    let rx = animator.subscribe();
    animator.animate_to(1_000);
    sleep(Duration::from_millis(12)).await;
    drop(animator);
    let frozen = *rx.borrow();
    sleep(Duration::from_millis(30)).await;
    assert_eq!(*rx.borrow(), frozen);
    assert!(frozen < 1_000);
}

#[tokio::test]
async fn board_animates_records_and_anomalies_from_view() {
    let api = FakeApi::new();
    api.status.push(Ok(status(90)));
    api.anomalies.push(Ok(vec![sample("a", 91.0), sample("b", 95.0)]));
    let c = AggregationController::new(api, WritePolicy::CompletionOrder);
    let board = CounterBoard::spawn(c.subscribe(), Duration::from_millis(1));
    assert_eq!(board.values(), CounterValues::default());

    c.refresh_all().await;

    wait_until(|| {
        board.values()
            == CounterValues {
                records: 90,
                anomalies: 2,
            }
    })
    .await;
}

#[tokio::test]
async fn board_restarts_only_when_number_changes() {
    let api = FakeApi::new();
    api.status.set_default(Ok(status(30)));
    let c = AggregationController::new(api, WritePolicy::CompletionOrder);
    let board = CounterBoard::spawn(c.subscribe(), Duration::from_millis(1));

    c.refresh_all().await;
    wait_until(|| board.values().records == 30).await;

    // same total again: the counter stays put instead of replaying from zero
    let mut records = board.records();
    let _ = records.borrow_and_update();
    c.refresh_all().await;
    sleep(Duration::from_millis(20)).await;
    assert!(!records.has_changed().unwrap());
    assert_eq!(board.values().records, 30);
}
