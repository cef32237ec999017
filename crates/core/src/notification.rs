// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expansion of decoded subscribe notifications into update events.
//!
//! A notification carries a prefix path and a list of updates. Keys in path
//! elements (`interface[name=eth0]`) become tags named `{elem}_{key}`; the
//! path without keys becomes the value name. Updates that share a tag set are
//! merged into one event.

use crate::event::{FieldValue, Meta, UpdateEvent, SOURCE, SUBSCRIPTION_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Anything the sink can expand into update events.
pub trait ToEvents {
    fn to_events(&self, measurement: &str, meta: &Meta) -> Result<Vec<UpdateEvent>, ConvertError>;
}

/// A decoded subscribe notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unix nanoseconds
    pub timestamp: i64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub updates: Vec<Update>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub path: String,
    pub value: serde_json::Value,
}

impl ToEvents for Notification {
    fn to_events(&self, measurement: &str, meta: &Meta) -> Result<Vec<UpdateEvent>, ConvertError> {
        let prefix = parse_path(&self.prefix)?;
        let mut grouped: BTreeMap<BTreeMap<String, String>, UpdateEvent> = BTreeMap::new();

        for update in &self.updates {
            let path = parse_path(&update.path)?;
            let mut tags = BTreeMap::new();
            for key in [SUBSCRIPTION_NAME, SOURCE] {
                if let Some(value) = meta.get(key) {
                    tags.insert(key.to_string(), value.clone());
                }
            }
            let mut name = String::new();
            for elem in prefix.iter().chain(path.iter()) {
                name.push('/');
                name.push_str(&elem.name);
                for (key, value) in &elem.keys {
                    tags.insert(format!("{}_{}", elem.name, key), value.clone());
                }
            }
            if name.is_empty() {
                name.push('/');
            }

            let event = grouped
                .entry(tags.clone())
                .or_insert_with(|| UpdateEvent {
                    name: measurement.to_string(),
                    tags,
                    values: BTreeMap::new(),
                    timestamp: self.timestamp,
                });
            insert_value(&mut event.values, &name, &update.value);
        }

        Ok(grouped
            .into_values()
            .filter(|ev| !ev.values.is_empty())
            .collect())
    }
}

impl ToEvents for UpdateEvent {
    fn to_events(&self, _measurement: &str, _meta: &Meta) -> Result<Vec<UpdateEvent>, ConvertError> {
        Ok(vec![self.clone()])
    }
}

/// Insert `value` under `name`, flattening nested objects into `name/key/...`.
fn insert_value(values: &mut BTreeMap<String, FieldValue>, name: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            let base = name.trim_end_matches('/');
            for (key, inner) in map {
                insert_value(values, &format!("{base}/{key}"), inner);
            }
        }
        other => match FieldValue::from_json(other) {
            Some(v) => {
                values.insert(name.to_string(), v);
            }
            None => tracing::debug!(field = name, "skipping non-scalar value"),
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
struct PathElem {
    name: String,
    keys: Vec<(String, String)>,
}

/// Split a path like `/a/b[k=v][k2=v2]/c` into elements. Keys may contain `/`.
fn parse_path(path: &str) -> Result<Vec<PathElem>, ConvertError> {
    let invalid = |reason: &str| ConvertError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| invalid("unbalanced ']'"))?;
                current.push(c);
            }
            '/' if depth == 0 => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(invalid("unterminated '['"));
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
        .into_iter()
        .map(|segment| {
            let (name, mut rest) = match segment.find('[') {
                Some(i) => (segment[..i].to_string(), &segment[i..]),
                None => (segment.clone(), ""),
            };
            if name.is_empty() {
                return Err(invalid("empty element name"));
            }
            let mut keys = Vec::new();
            while let Some(stripped) = rest.strip_prefix('[') {
                let end = stripped.find(']').ok_or_else(|| invalid("unterminated key"))?;
                let (key, value) = stripped[..end]
                    .split_once('=')
                    .ok_or_else(|| invalid("key without '='"))?;
                keys.push((key.to_string(), value.to_string()));
                rest = &stripped[end + 1..];
            }
            if !rest.is_empty() {
                return Err(invalid("trailing characters after key"));
            }
            Ok(PathElem { name, keys })
        })
        .collect()
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
