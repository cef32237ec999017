// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Update events handed to the sink by the decoding stage

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Metadata attached to a decoded response (subscription name, source, ...)
pub type Meta = HashMap<String, String>;

/// Metadata key carrying the subscription name
pub const SUBSCRIPTION_NAME: &str = "subscription-name";

/// Metadata key carrying the target the response came from
pub const SOURCE: &str = "source";

/// Measurement used when no subscription name is known
pub const DEFAULT_MEASUREMENT: &str = "default";

/// Resolve the measurement name for a response from its metadata.
pub fn measurement_name(meta: &Meta) -> &str {
    meta.get(SUBSCRIPTION_NAME)
        .map(String::as_str)
        .unwrap_or(DEFAULT_MEASUREMENT)
}

/// A scalar telemetry value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl FieldValue {
    /// Convert a JSON scalar. Objects, arrays and null have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::UInt(u))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

field_value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f64 => Float,
    String => String,
    &str => String,
}

/// A single update: named, tagged, timestamped set of values.
///
/// Consumed exactly once by exactly one writer worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub values: BTreeMap<String, FieldValue>,
    /// Unix nanoseconds
    pub timestamp: i64,
}

impl UpdateEvent {
    pub fn new(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            values: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
