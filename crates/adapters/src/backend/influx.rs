// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! InfluxDB v2 HTTP backend.
//!
//! Writers buffer line-protocol lines and submit them in batches, either
//! when `batch_size` lines are pending or every `flush_timer`. Batch failures
//! are reported on the writer's error stream and the batch is dropped.
//!
//! At most `MAX_PENDING_BATCHES` batches are buffered; points past that are
//! rejected with [`BackendError::BufferFull`]. Dropping a writer lets a batch
//! already on the wire finish and discards the rest.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use reqwest::{StatusCode, Url};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Notify};
use tsink_core::config::DEFAULT_FLUSH_TIMER;
use tsink_core::{Point, SinkConfig, MAX_DURATION};

use super::{line_protocol, BackendAdapter, BackendError, PointWriter, WriteErrors};

/// Buffered batches per writer before new points are rejected
pub const MAX_PENDING_BATCHES: usize = 8;

/// HTTP client for an InfluxDB v2 compatible API
#[derive(Clone)]
pub struct InfluxBackend {
    inner: Arc<Shared>,
}

struct Shared {
    http: reqwest::Client,
    base: Url,
    token: String,
    batch_size: usize,
    flush_timer: Duration,
    use_gzip: bool,
    debug: bool,
}

impl InfluxBackend {
    pub fn new(config: &SinkConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.url)
            .map_err(|e| BackendError::Setup(format!("invalid url {:?}: {e}", config.url)))?;
        // TLS verification is disabled when TLS is enabled explicitly
        let http = reqwest::Client::builder()
            .timeout(crate::env::http_timeout())
            .danger_accept_invalid_certs(config.enable_tls)
            .build()
            .map_err(|e| BackendError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Shared {
                http,
                base,
                token: config.token.clone(),
                batch_size: config.batch_size.max(1),
                flush_timer: if config.flush_timer.is_zero() {
                    DEFAULT_FLUSH_TIMER
                } else {
                    config.flush_timer.min(MAX_DURATION)
                },
                use_gzip: config.use_gzip,
                debug: config.debug,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base
            .join(path)
            .map_err(|e| BackendError::Setup(e.to_string()))
    }
}

#[async_trait]
impl BackendAdapter for InfluxBackend {
    type Writer = InfluxWriter;

    async fn health(&self) -> Result<Option<serde_json::Value>, BackendError> {
        let url = self.endpoint("health")?;
        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(BackendError::Unhealthy(body));
        }
        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        // Non-JSON bodies are passed through as strings for the caller to reject
        Ok(Some(
            serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)),
        ))
    }

    fn write_api(&self, org: &str, bucket: &str) -> (InfluxWriter, WriteErrors) {
        let (errors_tx, errors_rx) = mpsc::channel(crate::env::error_buffer());
        let batch = Arc::new(BatchState::default());
        let sender = BatchSender {
            backend: self.clone(),
            org: org.to_string(),
            bucket: bucket.to_string(),
            errors: errors_tx,
        };

        tokio::spawn(flush_loop(
            Arc::clone(&batch),
            sender.clone(),
            self.inner.flush_timer,
        ));

        (
            InfluxWriter {
                batch,
                sender,
                batch_size: self.inner.batch_size,
            },
            errors_rx,
        )
    }
}

#[derive(Default)]
struct BatchState {
    lines: Mutex<Vec<String>>,
    full: Notify,
    closed: Notify,
    /// Held for the whole of a submission so batches go out in order
    sending: tokio::sync::Mutex<()>,
}

impl BatchState {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    /// Submit everything pending, after any submission already in flight.
    async fn drain(&self, sender: &BatchSender) {
        let _sending = self.sending.lock().await;
        sender.send(self.take()).await;
    }
}

#[derive(Clone)]
struct BatchSender {
    backend: InfluxBackend,
    org: String,
    bucket: String,
    errors: mpsc::Sender<BackendError>,
}

impl BatchSender {
    async fn send(&self, lines: Vec<String>) {
        let size = self.backend.inner.batch_size;
        for chunk in lines.chunks(size) {
            if let Err(e) = self.post(chunk).await {
                self.report(e);
            }
        }
    }

    fn report(&self, err: BackendError) {
        match self.errors.try_send(err) {
            Ok(()) => {}
            Err(TrySendError::Full(err)) => {
                tracing::warn!(bucket = %self.bucket, error = %err, "write error stream full, dropping error");
            }
            Err(TrySendError::Closed(err)) => {
                tracing::debug!(bucket = %self.bucket, error = %err, "write error after writer closed");
            }
        }
    }

    async fn post(&self, lines: &[String]) -> Result<(), BackendError> {
        let shared = &self.backend.inner;
        let url = Url::parse_with_params(
            self.backend.endpoint("api/v2/write")?.as_str(),
            &[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ],
        )
        .map_err(|e| BackendError::Setup(e.to_string()))?;

        let body = lines.join("\n");
        if shared.debug {
            tracing::debug!(lines = lines.len(), %body, "writing batch");
        }

        let mut request = shared
            .http
            .post(url)
            .header("Content-Type", "text/plain; charset=utf-8");
        if !shared.token.is_empty() {
            request = request.header("Authorization", format!("Token {}", shared.token));
        }
        request = if shared.use_gzip {
            request
                .header("Content-Encoding", "gzip")
                .body(gzip(body.as_bytes())?)
        } else {
            request.body(body)
        };

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, BackendError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| BackendError::Request(format!("gzip: {e}")))
}

/// Submit on timer or full batch until the writer is dropped.
async fn flush_loop(batch: Arc<BatchState>, sender: BatchSender, period: Duration) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = batch.closed.notified() => break,
            _ = interval.tick() => {}
            _ = batch.full.notified() => {}
        }
        batch.drain(&sender).await;
    }
}

/// Writer handle of [`InfluxBackend`]
pub struct InfluxWriter {
    batch: Arc<BatchState>,
    sender: BatchSender,
    batch_size: usize,
}

#[async_trait]
impl PointWriter for InfluxWriter {
    fn write_point(&mut self, point: Point) {
        let line = match line_protocol::encode(&point) {
            Ok(line) => line,
            Err(e) => {
                self.sender.report(e);
                return;
            }
        };
        let limit = self.batch_size.saturating_mul(MAX_PENDING_BATCHES);
        let pending = {
            let mut lines = self.batch.lines.lock();
            if lines.len() >= limit {
                let pending = lines.len();
                drop(lines);
                self.sender.report(BackendError::BufferFull { pending });
                return;
            }
            lines.push(line);
            lines.len()
        };
        if pending >= self.batch_size {
            self.batch.full.notify_one();
        }
    }

    async fn flush(&mut self) {
        self.batch.drain(&self.sender).await;
    }
}

impl Drop for InfluxWriter {
    fn drop(&mut self) {
        self.batch.closed.notify_one();
    }
}

#[cfg(test)]
#[path = "influx_tests.rs"]
mod tests;
