// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset coordination between the health monitor and the writer workers.
//!
//! The failure signal fires once per Down transition and the recovery
//! signal once per Down -> Up transition, so after `n` outages the failure
//! generation is `n` and the recovery generation is `n` (healthy) or `n - 1`
//! (still down). Only the [`ResetTrigger`] fires; it refuses to fire out of
//! order, which keeps a recovery from ever preceding its failure.

use tsink_core::{EpochSignal, EpochWatch, HealthState};

/// Create the firing half (for the health monitor) and the observing half.
pub fn reset_coordinator() -> (ResetTrigger, ResetWatch) {
    let trigger = ResetTrigger {
        failure: EpochSignal::new(),
        recovery: EpochSignal::new(),
    };
    let watch = trigger.watch();
    (trigger, watch)
}

/// Firing half, owned by the health monitor
#[derive(Debug)]
pub struct ResetTrigger {
    failure: EpochSignal,
    recovery: EpochSignal,
}

impl ResetTrigger {
    /// Signal a failure. Returns the failure epoch, or `None` if a reset is
    /// already in progress.
    pub fn fire_failure(&self) -> Option<u64> {
        if self.failure.generation() > self.recovery.generation() {
            return None;
        }
        Some(self.failure.fire())
    }

    /// Signal recovery from the current failure. Returns `None` if there is
    /// no failure to recover from.
    pub fn fire_recovery(&self) -> Option<u64> {
        if self.recovery.generation() >= self.failure.generation() {
            return None;
        }
        Some(self.recovery.fire())
    }

    pub fn watch(&self) -> ResetWatch {
        ResetWatch {
            failure: self.failure.watch(),
            recovery: self.recovery.watch(),
        }
    }
}

/// Observing half, handed to workers and producers
#[derive(Debug, Clone)]
pub struct ResetWatch {
    failure: EpochWatch,
    recovery: EpochWatch,
}

impl ResetWatch {
    /// Current failure epoch (number of failures signalled so far)
    pub fn epoch(&self) -> u64 {
        self.failure.generation()
    }

    /// True between a failure and its recovery
    pub fn is_resetting(&self) -> bool {
        self.failure.generation() > self.recovery.generation()
    }

    /// Health as published through the signals.
    pub fn health(&self) -> HealthState {
        if self.is_resetting() {
            HealthState::Down
        } else {
            HealthState::Up
        }
    }

    /// Wait for a failure beyond `epoch`. Returns the new failure epoch.
    pub async fn failed_after(&mut self, epoch: u64) -> Option<u64> {
        self.failure.fired_after(epoch).await
    }

    /// Wait for the recovery that ends failure `epoch`.
    pub async fn recovered(&mut self, epoch: u64) -> Option<u64> {
        self.recovery.reached(epoch).await
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
