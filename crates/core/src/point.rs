// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Points written to the time-series backend

use crate::event::{FieldValue, UpdateEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single named, tagged, timestamped measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    /// Unix nanoseconds
    pub time: i64,
}

impl From<UpdateEvent> for Point {
    fn from(ev: UpdateEvent) -> Self {
        Self {
            measurement: ev.name,
            tags: ev.tags,
            fields: ev.values,
            time: ev.timestamp,
        }
    }
}
