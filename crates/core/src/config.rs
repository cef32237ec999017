// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink configuration and its defaults

use crate::duration::{serde_duration, MAX_DURATION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_URL: &str = "http://localhost:8086";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_FLUSH_TIMER: Duration = Duration::from_secs(10);
pub const DEFAULT_HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(30);
pub const DEFAULT_STARTUP_RETRY: Duration = Duration::from_secs(10);
pub const DEFAULT_NUM_WORKERS: usize = 1;
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Errors from decoding a sink configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid sink config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid sink config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration of the export sink.
///
/// Zero-valued fields are replaced by their defaults in [`SinkConfig::with_defaults`].
/// Unknown keys are ignored so the same map can carry registry fields like `type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
    pub batch_size: usize,
    #[serde(with = "serde_duration")]
    pub flush_timer: Duration,
    pub use_gzip: bool,
    pub enable_tls: bool,
    #[serde(with = "serde_duration")]
    pub health_check_period: Duration,
    pub debug: bool,
    pub num_workers: usize,
    pub queue_size: usize,
    /// Sleep between failed health probes while starting up
    #[serde(with = "serde_duration")]
    pub startup_retry: Duration,
}

impl SinkConfig {
    /// Decode from a generic config map and apply defaults.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_value(value.clone())?;
        Ok(cfg.with_defaults())
    }

    /// Decode from a TOML document and apply defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        Ok(cfg.with_defaults())
    }

    /// Load a TOML config file and apply defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Replace zero-valued fields with defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.url.is_empty() {
            self.url = DEFAULT_URL.to_string();
        }
        if self.batch_size == 0 {
            self.batch_size = DEFAULT_BATCH_SIZE;
        }
        if self.flush_timer.is_zero() {
            self.flush_timer = DEFAULT_FLUSH_TIMER;
        }
        if self.health_check_period.is_zero() {
            self.health_check_period = DEFAULT_HEALTH_CHECK_PERIOD;
        }
        if self.num_workers == 0 {
            self.num_workers = DEFAULT_NUM_WORKERS;
        }
        if self.queue_size == 0 {
            self.queue_size = DEFAULT_QUEUE_SIZE;
        }
        if self.startup_retry.is_zero() {
            self.startup_retry = DEFAULT_STARTUP_RETRY;
        }
        self.flush_timer = self.flush_timer.min(MAX_DURATION);
        self.health_check_period = self.health_check_period.min(MAX_DURATION);
        self.startup_retry = self.startup_retry.min(MAX_DURATION);
        self
    }

    /// Copy safe to log or expose for diagnostics (token masked).
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.token.is_empty() {
            cfg.token = "****".to_string();
        }
        cfg
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
