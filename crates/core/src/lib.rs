// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tsink-core: data model shared by the telemetry export sink

pub mod config;
pub mod duration;
pub mod event;
pub mod health;
pub mod notification;
pub mod point;
pub mod signal;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ConfigError, SinkConfig};
pub use duration::{format_duration, parse_duration, MAX_DURATION};
pub use event::{measurement_name, FieldValue, Meta, UpdateEvent};
pub use health::{HealthReport, HealthState, HealthStatus};
pub use notification::{ConvertError, Notification, ToEvents, Update};
pub use point::Point;
pub use signal::{EpochSignal, EpochWatch};
