// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::UpdateEvent;

/// Interface counter event as produced for one port
pub fn counter_event(port: &str, rx_bytes: u64, timestamp: i64) -> UpdateEvent {
    UpdateEvent::new("ifcounters", timestamp)
        .with_tag("port", port)
        .with_value("rx_bytes", rx_bytes)
}

/// `count` counter events with distinct timestamps
pub fn counter_events(count: usize) -> Vec<UpdateEvent> {
    (0..count)
        .map(|i| counter_event("1", i as u64, i as i64))
        .collect()
}
