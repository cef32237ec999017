// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot broadcast signals that re-arm as they fire.
//!
//! An [`EpochSignal`] carries a generation counter. Firing bumps the
//! generation and wakes every waiter in a single step, so the signal is
//! re-armed for the next epoch before any subscriber can observe it. Waiters
//! wait for the generation to pass a value they already observed, which means
//! a waiter that subscribes late still sees a fire it has not accounted for
//! and never sees one twice.

use tokio::sync::watch;

/// Firing half. Owned by exactly one task.
#[derive(Debug)]
pub struct EpochSignal {
    tx: watch::Sender<u64>,
}

impl Default for EpochSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl EpochSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Wake all waiters and re-arm. Returns the new generation.
    pub fn fire(&self) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|g| {
            *g += 1;
            generation = *g;
        });
        generation
    }

    /// Number of times this signal has fired
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> EpochWatch {
        EpochWatch {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observing half. Cheap to clone; every clone waits independently.
#[derive(Debug, Clone)]
pub struct EpochWatch {
    rx: watch::Receiver<u64>,
}

impl EpochWatch {
    pub fn generation(&self) -> u64 {
        *self.rx.borrow()
    }

    /// Wait until the signal fires past generation `seen`.
    ///
    /// Returns immediately if it already has. Returns `None` once the firing
    /// half is dropped without having fired past `seen`.
    pub async fn fired_after(&mut self, seen: u64) -> Option<u64> {
        self.rx.wait_for(|g| *g > seen).await.ok().map(|g| *g)
    }

    /// Wait until the signal has fired at least `target` times.
    pub async fn reached(&mut self, target: u64) -> Option<u64> {
        self.rx.wait_for(|g| *g >= target).await.ok().map(|g| *g)
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
