// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::backend::{FakeBackend, FakeHealth};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

/// Assert that captured logs contain the expected substring
fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}",);
}

#[test]
#[serial(tracing)]
fn traced_health_logs_answer() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedBackend::new(FakeBackend::new());
        traced.health().await
    });

    assert!(result.unwrap().is_some());
    assert_log(&logs, "span", "backend.health");
    assert_log(&logs, "answer", "probe answered");
    assert_log(&logs, "latency", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn traced_health_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeBackend::new();
        fake.set_health(FakeHealth::Down);
        TracedBackend::new(fake).health().await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "probe failed");
    assert_log(&logs, "error", "connection refused");
}

#[test]
#[serial(tracing)]
fn traced_write_api_logs_bucket_and_delegates() {
    let fake = FakeBackend::new();
    let (logs, _writer) = with_tracing(|| async {
        let traced = TracedBackend::new(fake.clone());
        traced.write_api("netops", "telemetry")
    });

    assert_log(&logs, "span", "backend.write_api");
    assert_log(&logs, "bucket", "bucket=\"telemetry\"");
    assert_eq!(fake.writers_opened(), 1);
}
