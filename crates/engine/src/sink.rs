// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink lifecycle: startup gate, worker spawn, delivery and shutdown

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tsink_adapters::{BackendAdapter, BackendError};
use tsink_core::{measurement_name, HealthState, Meta, SinkConfig, ToEvents, UpdateEvent};

use crate::coordinator::{reset_coordinator, ResetWatch};
use crate::dispatch::{dispatch_queue, Delivery, DispatchQueue};
use crate::error::SinkError;
use crate::monitor::HealthMonitor;
use crate::stats::{SinkStats, StatsSnapshot};
use crate::worker::{Worker, WorkerContext};

/// A running export sink.
///
/// Dropping the handle does not stop the background tasks; call
/// [`Sink::close`] or cancel the token passed at startup, then await
/// [`Sink::closed`] to let the workers flush.
pub struct Sink {
    config: SinkConfig,
    queue: DispatchQueue,
    reset: ResetWatch,
    cancel: CancellationToken,
    stats: Arc<SinkStats>,
    tasks: Mutex<JoinSet<()>>,
}

/// Diagnostic view of a sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkSnapshot {
    pub config: SinkConfig,
    pub health: HealthState,
    pub stats: StatsSnapshot,
}

impl Sink {
    /// Decode a generic config map and start the sink.
    ///
    /// Config errors fail immediately; an unhealthy backend is retried until
    /// it answers or `cancel` fires.
    pub async fn initialize<B, F>(
        config: &serde_json::Value,
        connect: F,
        cancel: &CancellationToken,
    ) -> Result<Self, SinkError>
    where
        B: BackendAdapter,
        F: FnOnce(&SinkConfig) -> Result<B, BackendError>,
    {
        let config = SinkConfig::from_value(config)?;
        Self::start(config, connect, cancel).await
    }

    pub async fn start<B, F>(
        config: SinkConfig,
        connect: F,
        cancel: &CancellationToken,
    ) -> Result<Self, SinkError>
    where
        B: BackendAdapter,
        F: FnOnce(&SinkConfig) -> Result<B, BackendError>,
    {
        let config = config.with_defaults();
        let backend = connect(&config).map_err(SinkError::Backend)?;
        let cancel = cancel.child_token();

        let (trigger, reset) = reset_coordinator();
        let mut monitor =
            HealthMonitor::new(backend.clone(), trigger, config.health_check_period);
        monitor.wait_until_up(config.startup_retry, &cancel).await?;
        let mut tasks = JoinSet::new();
        tasks.spawn(monitor.run(cancel.clone()));

        let stats = Arc::new(SinkStats::default());
        let (queue, rx) = dispatch_queue(config.queue_size, reset.clone(), cancel.clone());
        let ctx = WorkerContext {
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            queue: rx,
            reset: reset.clone(),
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
        };
        for index in 0..config.num_workers {
            let worker = Worker::new(index, backend.clone(), ctx.clone());
            tasks.spawn(worker.run());
        }

        // Same notice whether close() or the caller's token ended the sink
        let closer = cancel.clone();
        let closing = Arc::clone(&stats);
        tasks.spawn(async move {
            closer.cancelled().await;
            let stats = closing.snapshot();
            info!(
                delivered = stats.delivered,
                dropped = stats.dropped,
                "sink shutting down"
            );
        });

        info!(
            url = %config.url,
            org = %config.org,
            bucket = %config.bucket,
            workers = config.num_workers,
            "sink started"
        );
        Ok(Self {
            config,
            queue,
            reset,
            cancel,
            stats,
            tasks: Mutex::new(tasks),
        })
    }

    /// Expand `response` into events and deliver them.
    ///
    /// Returns the number of events queued. Conversion errors are logged and
    /// drop the whole response; a reset or shutdown drops the remainder.
    pub async fn write<R>(&self, response: &R, meta: &Meta) -> usize
    where
        R: ToEvents + ?Sized,
    {
        let events = match response.to_events(measurement_name(meta), meta) {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "failed to convert response");
                return 0;
            }
        };

        let total = events.len();
        let mut delivered = 0;
        for event in events {
            let outcome = self.write_event(event).await;
            if !outcome.is_delivered() {
                let remaining = total - delivered - 1;
                self.stats.record_dropped(remaining as u64);
                debug!(?outcome, dropped = remaining + 1, "dropping events");
                break;
            }
            delivered += 1;
        }
        delivered
    }

    /// Deliver a single event.
    pub async fn write_event(&self, event: UpdateEvent) -> Delivery {
        let outcome = self.queue.send(event).await;
        if outcome.is_delivered() {
            self.stats.record_delivered();
        } else {
            self.stats.record_dropped(1);
        }
        outcome
    }

    /// Stop the monitor and workers. Does not wait for them.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Wait until the monitor and every worker have exited.
    ///
    /// Workers flush their writer on the way out. Returns immediately if the
    /// tasks were already reaped.
    pub async fn closed(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "sink task failed");
            }
        }
    }

    /// Close the sink and wait up to `grace` for its tasks to finish.
    ///
    /// Tasks still running at the deadline are aborted.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), SinkError> {
        self.close();
        if tokio::time::timeout(grace, self.closed()).await.is_ok() {
            return Ok(());
        }
        let mut tasks = self.tasks.lock().await;
        let stuck = tasks.len();
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        Err(SinkError::ShutdownTimeout { grace, stuck })
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Backend health as last published by the monitor
    pub fn health(&self) -> HealthState {
        self.reset.health()
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn describe(&self) -> SinkSnapshot {
        SinkSnapshot {
            config: self.config.redacted(),
            health: self.health(),
            stats: self.stats(),
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.describe()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
