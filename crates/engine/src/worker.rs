// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writer workers.
//!
//! Each worker owns one backend writer at a time. A failure signal tears the
//! writer down without flushing it; the worker then sits idle until the
//! matching recovery signal and opens a fresh writer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tsink_adapters::{BackendAdapter, PointWriter};
use tsink_core::Point;

use crate::coordinator::ResetWatch;
use crate::dispatch::DispatchReceiver;
use crate::stats::SinkStats;

/// State shared by every worker of a sink
#[derive(Clone)]
pub struct WorkerContext {
    pub org: String,
    pub bucket: String,
    pub queue: DispatchReceiver,
    pub reset: ResetWatch,
    pub cancel: CancellationToken,
    pub stats: Arc<SinkStats>,
}

pub struct Worker<B> {
    index: usize,
    backend: B,
    ctx: WorkerContext,
}

/// Why a writer session ended
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    Terminated,
    /// Torn down by failure epoch
    Reset(u64),
}

impl<B: BackendAdapter> Worker<B> {
    pub fn new(index: usize, backend: B, ctx: WorkerContext) -> Self {
        Self {
            index,
            backend,
            ctx,
        }
    }

    /// Consume events until cancelled or the queue closes.
    pub async fn run(mut self) {
        info!(worker = self.index, "worker started");
        let mut rebuild_after: Option<u64> = None;
        loop {
            if let Some(failure) = rebuild_after.take() {
                let recovered = tokio::select! {
                    biased;
                    _ = self.ctx.cancel.cancelled() => None,
                    recovered = self.ctx.reset.recovered(failure) => recovered,
                };
                if recovered.is_none() {
                    break;
                }
                debug!(worker = self.index, failure, "rebuilding writer");
            }

            let epoch = self.ctx.reset.epoch();
            if self.ctx.reset.is_resetting() {
                rebuild_after = Some(epoch);
                continue;
            }

            match self.run_writer(epoch).await {
                Exit::Terminated => break,
                Exit::Reset(failure) => rebuild_after = Some(failure),
            }
        }
        info!(worker = self.index, "worker stopped");
    }

    async fn run_writer(&mut self, epoch: u64) -> Exit {
        let (mut writer, mut errors) = self.backend.write_api(&self.ctx.org, &self.ctx.bucket);
        debug!(worker = self.index, epoch, "writer opened");
        let mut errors_open = true;

        loop {
            tokio::select! {
                _ = self.ctx.cancel.cancelled() => {
                    writer.flush().await;
                    return Exit::Terminated;
                }
                Some(failure) = self.ctx.reset.failed_after(epoch) => {
                    warn!(worker = self.index, failure, "backend failed, dropping writer");
                    self.ctx.stats.record_rebuild();
                    return Exit::Reset(failure);
                }
                event = self.ctx.queue.recv() => match event {
                    Some(event) => {
                        writer.write_point(Point::from(event));
                        self.ctx.stats.record_written();
                    }
                    None => {
                        writer.flush().await;
                        return Exit::Terminated;
                    }
                },
                err = errors.recv(), if errors_open => match err {
                    Some(e) => {
                        error!(worker = self.index, error = %e, "write failed");
                        self.ctx.stats.record_write_error();
                    }
                    None => errors_open = false,
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
