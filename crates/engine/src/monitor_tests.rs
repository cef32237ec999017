// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for monitor module

use super::*;
use crate::coordinator::reset_coordinator;
use crate::ResetWatch;
use tsink_adapters::{FakeBackend, FakeHealth};

const PERIOD: Duration = Duration::from_secs(30);

fn monitor(backend: &FakeBackend) -> (HealthMonitor<FakeBackend>, ResetWatch) {
    let (trigger, watch) = reset_coordinator();
    (HealthMonitor::new(backend.clone(), trigger, PERIOD), watch)
}

#[yare::parameterized(
    report    = { FakeHealth::Up,        true },
    no_report = { FakeHealth::Silent,    true },
    malformed = { FakeHealth::Malformed, false },
    failed    = { FakeHealth::Down,      false },
)]
fn probe_classification(health: FakeHealth, healthy: bool) {
    let backend = FakeBackend::new();
    backend.set_health(health);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    assert_eq!(rt.block_on(probe(&backend)).is_ok(), healthy);
}

#[tokio::test]
async fn malformed_report_is_distinguished() {
    let backend = FakeBackend::new();
    backend.set_health(FakeHealth::Malformed);
    assert!(matches!(
        probe(&backend).await,
        Err(ProbeError::Malformed(_))
    ));
}

#[tokio::test]
async fn transitions_fire_signals_once() {
    let backend = FakeBackend::new();
    let cancel = CancellationToken::new();
    let (mut monitor, watch) = monitor(&backend);

    backend.script_health([
        FakeHealth::Up,
        FakeHealth::Down,
        FakeHealth::Malformed,
        FakeHealth::Down,
        FakeHealth::Silent,
        FakeHealth::Up,
    ]);

    assert_eq!(monitor.check(&cancel).await, Some(HealthState::Up));
    assert_eq!(watch.epoch(), 0);

    for _ in 0..3 {
        assert_eq!(monitor.check(&cancel).await, Some(HealthState::Down));
    }
    assert_eq!(watch.epoch(), 1, "repeated down probes must not re-fire");
    assert!(watch.is_resetting());

    assert_eq!(monitor.check(&cancel).await, Some(HealthState::Up));
    assert_eq!(monitor.check(&cancel).await, Some(HealthState::Up));
    assert!(!watch.is_resetting());
    assert_eq!(watch.epoch(), 1);
}

#[tokio::test]
async fn failures_before_first_up_do_not_fire() {
    let backend = FakeBackend::new();
    backend.set_health(FakeHealth::Down);
    let cancel = CancellationToken::new();
    let (mut monitor, watch) = monitor(&backend);

    assert_eq!(monitor.check(&cancel).await, Some(HealthState::Unknown));
    assert_eq!(watch.epoch(), 0);
}

#[tokio::test(start_paused = true)]
async fn wait_until_up_retries_with_fixed_sleep() {
    let backend = FakeBackend::new();
    backend.script_health([FakeHealth::Down, FakeHealth::Down, FakeHealth::Malformed]);
    let cancel = CancellationToken::new();
    let (mut monitor, _watch) = monitor(&backend);

    let start = tokio::time::Instant::now();
    monitor
        .wait_until_up(Duration::from_secs(10), &cancel)
        .await
        .unwrap();

    assert_eq!(backend.probe_count(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert_eq!(monitor.state(), HealthState::Up);
}

#[tokio::test(start_paused = true)]
async fn wait_until_up_stops_on_cancel() {
    let backend = FakeBackend::new();
    backend.set_health(FakeHealth::Down);
    let cancel = CancellationToken::new();
    let (mut monitor, _watch) = monitor(&backend);

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        canceller.cancel();
    });

    let result = monitor.wait_until_up(Duration::from_secs(10), &cancel).await;
    assert!(matches!(result, Err(SinkError::Cancelled)));
    assert_eq!(backend.probe_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn run_probes_every_period_until_cancelled() {
    let backend = FakeBackend::new();
    let cancel = CancellationToken::new();
    let (mut monitor, watch) = monitor(&backend);
    monitor.wait_until_up(PERIOD, &cancel).await.unwrap();

    backend.set_health(FakeHealth::Down);
    let task = tokio::spawn(monitor.run(cancel.clone()));

    tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
    assert_eq!(backend.probe_count(), 2);
    assert!(watch.is_resetting());

    backend.set_health(FakeHealth::Up);
    tokio::time::sleep(PERIOD).await;
    assert_eq!(backend.probe_count(), 3);
    assert!(!watch.is_resetting());

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn run_with_unbounded_period_stops_on_cancel() {
    let backend = FakeBackend::new();
    let cancel = CancellationToken::new();
    let (trigger, _watch) = reset_coordinator();
    let monitor = HealthMonitor::new(backend.clone(), trigger, Duration::MAX);
    let task = tokio::spawn(monitor.run(cancel.clone()));

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(backend.calls().is_empty());

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn zero_period_does_not_spin() {
    let backend = FakeBackend::new();
    let cancel = CancellationToken::new();
    let (trigger, _watch) = reset_coordinator();
    let monitor = HealthMonitor::new(backend.clone(), trigger, Duration::ZERO);
    let task = tokio::spawn(monitor.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(backend.calls().len() <= 11);

    cancel.cancel();
    task.await.unwrap();
}
