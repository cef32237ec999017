// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::backend::{BackendAdapter, BackendError, WriteErrors};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any BackendAdapter
#[derive(Clone)]
pub struct TracedBackend<B> {
    inner: B,
}

impl<B> TracedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: BackendAdapter> BackendAdapter for TracedBackend<B> {
    type Writer = B::Writer;

    async fn health(&self) -> Result<Option<serde_json::Value>, BackendError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.health().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(Some(_)) => tracing::debug!(elapsed_ms, "probe answered"),
                Ok(None) => tracing::debug!(elapsed_ms, "probe answered without report"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "probe failed"),
            }
            result
        }
        .instrument(tracing::debug_span!("backend.health"))
        .await
    }

    fn write_api(&self, org: &str, bucket: &str) -> (Self::Writer, WriteErrors) {
        tracing::info_span!("backend.write_api", org, bucket)
            .in_scope(|| tracing::debug!("opening writer"));
        self.inner.write_api(org, bucket)
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
