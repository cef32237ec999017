// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sink engine

use std::time::Duration;

use thiserror::Error;
use tsink_adapters::BackendError;
use tsink_core::ConfigError;

/// Errors from sink startup and shutdown
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create backend client: {0}")]
    Backend(#[source] BackendError),
    #[error("cancelled before the backend became healthy")]
    Cancelled,
    #[error("{stuck} sink task(s) still running after {grace:?}")]
    ShutdownTimeout { grace: Duration, stuck: usize },
}

/// Why a health probe classified the backend as down
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("health check failed: {0}")]
    Failed(#[from] BackendError),
    #[error("malformed health report: {0}")]
    Malformed(#[source] serde_json::Error),
}
