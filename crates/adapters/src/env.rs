// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Per-request HTTP timeout (default: 20000ms).
pub fn http_timeout() -> Duration {
    parse_duration_ms("TSINK_HTTP_TIMEOUT_MS").unwrap_or(Duration::from_secs(20))
}

/// Capacity of each writer's async error stream (default: 64).
pub fn error_buffer() -> usize {
    std::env::var("TSINK_WRITE_ERROR_BUFFER")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(64)
}
