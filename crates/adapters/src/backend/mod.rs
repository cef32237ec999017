// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-series backend adapters

mod influx;
pub mod line_protocol;

pub use influx::{InfluxBackend, InfluxWriter, MAX_PENDING_BATCHES};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend, FakeHealth, FakeWriter};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tsink_core::Point;

/// Errors from backend operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("client setup failed: {0}")]
    Setup(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend unhealthy: {0}")]
    Unhealthy(String),
    #[error("write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid point: {0}")]
    InvalidPoint(String),
    #[error("write buffer full with {pending} lines pending, point dropped")]
    BufferFull { pending: usize },
}

/// Asynchronous error stream of a writer handle.
///
/// Closes when the writer is dropped.
pub type WriteErrors = mpsc::Receiver<BackendError>;

/// Client for a time-series backend
#[async_trait]
pub trait BackendAdapter: Clone + Send + Sync + 'static {
    type Writer: PointWriter;

    /// Probe backend health.
    ///
    /// `Ok(None)` means the backend answered without a report. A returned
    /// payload is not validated here; callers decide whether it is usable.
    async fn health(&self) -> Result<Option<serde_json::Value>, BackendError>;

    /// Open a writer bound to `org`/`bucket` together with its error stream.
    fn write_api(&self, org: &str, bucket: &str) -> (Self::Writer, WriteErrors);
}

/// Buffered, fire-and-forget point submission.
///
/// Dropping a writer discards whatever it still buffers. A submission
/// already in flight may still complete.
#[async_trait]
pub trait PointWriter: Send + 'static {
    /// Queue a point. Failures surface on the writer's error stream.
    fn write_point(&mut self, point: Point);

    /// Submit everything buffered so far.
    async fn flush(&mut self);
}
