// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backend adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BackendAdapter, BackendError, PointWriter, WriteErrors};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tsink_core::Point;

/// Recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Health,
    WriteApi { org: String, bucket: String },
    WritePoint { writer: usize, point: Point },
    Flush { writer: usize },
}

/// Outcome of one health probe
#[derive(Debug, Clone)]
pub enum FakeHealth {
    /// Healthy with a well-formed report
    Up,
    /// Healthy without a report
    Silent,
    /// Answers with a payload that is not a health report
    Malformed,
    /// Probe call fails
    Down,
}

struct FakeBackendState {
    calls: Vec<BackendCall>,
    scripted: VecDeque<FakeHealth>,
    health: FakeHealth,
    next_writer: usize,
    live_writers: usize,
    error_senders: Vec<mpsc::Sender<BackendError>>,
    flush_delay: Duration,
}

/// Fake backend for testing.
///
/// Health probes consume scripted outcomes first, then repeat the current
/// steady outcome (`Up` unless changed).
#[derive(Clone)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeBackendState>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeBackendState {
                calls: Vec::new(),
                scripted: VecDeque::new(),
                health: FakeHealth::Up,
                next_writer: 0,
                live_writers: 0,
                error_senders: Vec::new(),
                flush_delay: Duration::ZERO,
            })),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outcome returned once scripted outcomes are exhausted
    pub fn set_health(&self, health: FakeHealth) {
        self.inner.lock().health = health;
    }

    /// Queue outcomes for the next probes
    pub fn script_health(&self, outcomes: impl IntoIterator<Item = FakeHealth>) {
        self.inner.lock().scripted.extend(outcomes);
    }

    /// Make every flush take `delay` before it is recorded
    pub fn set_flush_delay(&self, delay: Duration) {
        self.inner.lock().flush_delay = delay;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    /// Points submitted through any writer, in submission order
    pub fn points(&self) -> Vec<Point> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::WritePoint { point, .. } => Some(point.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn probe_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Health))
    }

    /// Number of writer handles ever opened
    pub fn writers_opened(&self) -> usize {
        self.inner.lock().next_writer
    }

    /// Number of writer handles not yet dropped
    pub fn live_writers(&self) -> usize {
        self.inner.lock().live_writers
    }

    pub fn flush_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Flush { .. }))
    }

    /// Push an async write error onto writer `writer`'s error stream.
    ///
    /// Returns false if that writer has been dropped.
    pub fn inject_write_error(&self, writer: usize, error: BackendError) -> bool {
        let sender = self.inner.lock().error_senders.get(writer).cloned();
        sender.is_some_and(|tx| tx.try_send(error).is_ok())
    }

    fn count(&self, f: impl Fn(&BackendCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| f(c)).count()
    }
}

#[async_trait]
impl BackendAdapter for FakeBackend {
    type Writer = FakeWriter;

    async fn health(&self) -> Result<Option<serde_json::Value>, BackendError> {
        let outcome = {
            let mut inner = self.inner.lock();
            inner.calls.push(BackendCall::Health);
            inner
                .scripted
                .pop_front()
                .unwrap_or_else(|| inner.health.clone())
        };
        match outcome {
            FakeHealth::Up => Ok(Some(serde_json::json!({
                "name": "fake",
                "status": "pass",
            }))),
            FakeHealth::Silent => Ok(None),
            FakeHealth::Malformed => Ok(Some(serde_json::json!({ "status": 42 }))),
            FakeHealth::Down => Err(BackendError::Request("connection refused".to_string())),
        }
    }

    fn write_api(&self, org: &str, bucket: &str) -> (FakeWriter, WriteErrors) {
        let (tx, rx) = mpsc::channel(16);
        let mut inner = self.inner.lock();
        let id = inner.next_writer;
        inner.next_writer += 1;
        inner.live_writers += 1;
        inner.error_senders.push(tx.clone());
        inner.calls.push(BackendCall::WriteApi {
            org: org.to_string(),
            bucket: bucket.to_string(),
        });
        (
            FakeWriter {
                id,
                backend: self.clone(),
                _errors: tx,
            },
            rx,
        )
    }
}

/// Writer handle of [`FakeBackend`]; records points immediately.
pub struct FakeWriter {
    id: usize,
    backend: FakeBackend,
    _errors: mpsc::Sender<BackendError>,
}

impl FakeWriter {
    pub fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl PointWriter for FakeWriter {
    fn write_point(&mut self, point: Point) {
        self.backend.inner.lock().calls.push(BackendCall::WritePoint {
            writer: self.id,
            point,
        });
    }

    async fn flush(&mut self) {
        let delay = self.backend.inner.lock().flush_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.backend
            .inner
            .lock()
            .calls
            .push(BackendCall::Flush { writer: self.id });
    }
}

impl Drop for FakeWriter {
    fn drop(&mut self) {
        let mut inner = self.backend.inner.lock();
        inner.live_writers -= 1;
        // Close the error stream along with the writer
        if let Some(slot) = inner.error_senders.get_mut(self.id) {
            let (closed, _) = mpsc::channel(1);
            *slot = closed;
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
