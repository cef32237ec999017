// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tsink_adapters::FakeBackend;
use tsink_core::SinkConfig;

use crate::coordinator::{reset_coordinator, ResetTrigger};
use crate::dispatch::{dispatch_queue, DispatchQueue};
use crate::stats::SinkStats;
use crate::worker::{Worker, WorkerContext};

/// Poll `cond` every 10ms (virtual time under `start_paused`) until it holds.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met after 10s");
}

/// Config pointing at a fake backend with short timers
pub(crate) fn test_config() -> SinkConfig {
    SinkConfig {
        org: "acme".to_string(),
        bucket: "telemetry".to_string(),
        health_check_period: Duration::from_secs(30),
        startup_retry: Duration::from_secs(10),
        ..SinkConfig::default()
    }
    .with_defaults()
}

/// One worker wired to a fresh queue and coordinator.
pub(crate) struct WorkerFixture {
    pub backend: FakeBackend,
    pub trigger: ResetTrigger,
    pub queue: DispatchQueue,
    pub cancel: CancellationToken,
    pub stats: Arc<SinkStats>,
    pub ctx: WorkerContext,
}

impl WorkerFixture {
    pub fn new(capacity: usize) -> Self {
        let backend = FakeBackend::new();
        let (trigger, watch) = reset_coordinator();
        let cancel = CancellationToken::new();
        let (queue, rx) = dispatch_queue(capacity, watch.clone(), cancel.clone());
        let stats = Arc::new(SinkStats::default());
        let ctx = WorkerContext {
            org: "acme".to_string(),
            bucket: "telemetry".to_string(),
            queue: rx,
            reset: watch,
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
        };
        Self {
            backend,
            trigger,
            queue,
            cancel,
            stats,
            ctx,
        }
    }

    pub fn spawn_worker(&self, index: usize) -> tokio::task::JoinHandle<()> {
        let worker = Worker::new(index, self.backend.clone(), self.ctx.clone());
        tokio::spawn(worker.run())
    }
}
