// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! InfluxDB line protocol encoding

use std::fmt::Write;
use tsink_core::{FieldValue, Point};

use super::BackendError;

/// Encode a point as one line (without trailing newline).
pub fn encode(point: &Point) -> Result<String, BackendError> {
    if point.measurement.is_empty() {
        return Err(BackendError::InvalidPoint("empty measurement".to_string()));
    }

    let mut line = String::with_capacity(64);
    escape_into(&mut line, &point.measurement, &[',', ' ']);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    let mut first = true;
    for (key, value) in &point.fields {
        if key.is_empty() {
            continue;
        }
        if let FieldValue::Float(f) = value {
            if !f.is_finite() {
                continue;
            }
        }
        line.push(if first { ' ' } else { ',' });
        first = false;
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        push_field_value(&mut line, value);
    }
    if first {
        return Err(BackendError::InvalidPoint(format!(
            "{}: no writable fields",
            point.measurement
        )));
    }

    let _ = write!(line, " {}", point.time);
    Ok(line)
}

fn push_field_value(line: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Bool(b) => line.push_str(if *b { "true" } else { "false" }),
        FieldValue::Int(i) => {
            let _ = write!(line, "{i}i");
        }
        FieldValue::UInt(u) => {
            let _ = write!(line, "{u}u");
        }
        FieldValue::Float(f) => {
            let _ = write!(line, "{f}");
        }
        FieldValue::String(s) => {
            line.push('"');
            escape_into(line, s, &['"', '\\']);
            line.push('"');
        }
    }
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
#[path = "line_protocol_tests.rs"]
mod tests;
