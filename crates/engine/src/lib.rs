// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Streaming export sink: health monitoring, reset coordination and the
//! writer worker pool

mod coordinator;
mod dispatch;
mod error;
mod monitor;
mod sink;
mod stats;
mod worker;

#[cfg(test)]
mod test_helpers;

pub use coordinator::{reset_coordinator, ResetTrigger, ResetWatch};
pub use dispatch::{dispatch_queue, Delivery, DispatchQueue, DispatchReceiver};
pub use error::{ProbeError, SinkError};
pub use monitor::{probe, HealthMonitor};
pub use sink::{Sink, SinkSnapshot};
pub use stats::{SinkStats, StatsSnapshot};
pub use worker::{Worker, WorkerContext};
