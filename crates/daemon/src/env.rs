// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "tsink.toml";

/// Resolve config path: explicit argument > TSINK_CONFIG > ./tsink.toml
pub fn config_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var("TSINK_CONFIG").ok())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

/// Log file override; logs go to stderr when unset
pub fn log_file() -> Option<PathBuf> {
    std::env::var("TSINK_LOG_FILE")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// How long shutdown waits for workers to flush (default: 10000ms).
pub fn shutdown_grace() -> Duration {
    std::env::var("TSINK_SHUTDOWN_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
