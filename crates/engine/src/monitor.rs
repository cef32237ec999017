// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend health monitoring.
//!
//! The monitor is the only owner of [`HealthState`] and the only task that
//! fires reset signals. Everyone else learns about transitions through the
//! [`ResetWatch`](crate::ResetWatch) half of the coordinator.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tsink_adapters::BackendAdapter;
use tsink_core::{HealthReport, HealthState, MAX_DURATION};

use crate::coordinator::ResetTrigger;
use crate::error::{ProbeError, SinkError};

/// Probe the backend once.
///
/// `Ok(None)` means healthy without a report. A payload that does not parse
/// as a health report is an error.
pub async fn probe<B: BackendAdapter>(backend: &B) -> Result<Option<HealthReport>, ProbeError> {
    match backend.health().await? {
        None => Ok(None),
        Some(raw) => HealthReport::interpret(&raw)
            .map(Some)
            .map_err(ProbeError::Malformed),
    }
}

/// Periodic health checker owning the reset trigger
///
/// The period is clamped to `1ms..=MAX_DURATION`.
pub struct HealthMonitor<B> {
    backend: B,
    trigger: ResetTrigger,
    state: HealthState,
    period: Duration,
}

impl<B: BackendAdapter> HealthMonitor<B> {
    pub fn new(backend: B, trigger: ResetTrigger, period: Duration) -> Self {
        Self {
            backend,
            trigger,
            state: HealthState::Unknown,
            period: period.clamp(Duration::from_millis(1), MAX_DURATION),
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Probe once and apply the resulting transition.
    ///
    /// Returns `None` if cancelled mid-probe; the state is left untouched.
    pub async fn check(&mut self, cancel: &CancellationToken) -> Option<HealthState> {
        let result = tokio::select! {
            _ = cancel.cancelled() => return None,
            result = probe(&self.backend) => result,
        };

        let healthy = match result {
            Ok(Some(report)) => {
                debug!(status = ?report.status, message = ?report.message, "health check result");
                true
            }
            Ok(None) => {
                debug!("health check result is empty");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed health check");
                false
            }
        };
        self.transition(healthy);
        Some(self.state)
    }

    fn transition(&mut self, healthy: bool) {
        match (self.state, healthy) {
            (HealthState::Unknown, true) => {
                info!("backend is up");
                self.state = HealthState::Up;
            }
            (HealthState::Up, false) => {
                self.state = HealthState::Down;
                if let Some(epoch) = self.trigger.fire_failure() {
                    warn!(epoch, "backend is down, resetting writers");
                }
            }
            (HealthState::Down, true) => {
                self.state = HealthState::Up;
                if let Some(epoch) = self.trigger.fire_recovery() {
                    info!(epoch, "backend recovered, restarting writers");
                }
            }
            // Still down, still up, or never up yet
            _ => {}
        }
    }

    /// Block until the first successful probe, sleeping `retry` between
    /// attempts. Retries forever unless cancelled.
    pub async fn wait_until_up(
        &mut self,
        retry: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        loop {
            match self.check(cancel).await {
                Some(HealthState::Up) => return Ok(()),
                Some(_) => {
                    warn!(retry_ms = retry.as_millis() as u64, "backend not healthy yet, retrying");
                }
                None => return Err(SinkError::Cancelled),
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(SinkError::Cancelled),
                _ = tokio::time::sleep(retry) => {}
            }
        }
    }

    /// Check health every period until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        let start = tokio::time::Instant::now() + self.period;
        let mut ticker = tokio::time::interval_at(start, self.period);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if self.check(&cancel).await.is_none() {
                        break;
                    }
                }
            }
        }
        debug!("health monitor stopped");
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
