// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn measurement_defaults_without_subscription_name() {
    let meta = Meta::new();
    assert_eq!(measurement_name(&meta), "default");
}

#[test]
fn measurement_uses_subscription_name() {
    let mut meta = Meta::new();
    meta.insert(SUBSCRIPTION_NAME.to_string(), "ifcounters".to_string());
    assert_eq!(measurement_name(&meta), "ifcounters");
}

#[yare::parameterized(
    boolean  = { json!(true),         Some(FieldValue::Bool(true)) },
    signed   = { json!(-4),           Some(FieldValue::Int(-4)) },
    unsigned = { json!(u64::MAX),     Some(FieldValue::UInt(u64::MAX)) },
    float    = { json!(1.5),          Some(FieldValue::Float(1.5)) },
    string   = { json!("up"),         Some(FieldValue::String("up".into())) },
    null     = { json!(null),         None },
    array    = { json!([1, 2]),       None },
    object   = { json!({"a": 1}),     None },
)]
fn field_value_from_json(input: serde_json::Value, expected: Option<FieldValue>) {
    assert_eq!(FieldValue::from_json(&input), expected);
}

#[test]
fn update_event_deserializes_untagged_values() {
    let ev: UpdateEvent = serde_json::from_value(json!({
        "name": "ifcounters",
        "tags": {"port": "1"},
        "values": {"rx_bytes": 100, "oper": "up", "util": 0.25},
        "timestamp": 42
    }))
    .unwrap();

    assert_eq!(ev.values["rx_bytes"], FieldValue::Int(100));
    assert_eq!(ev.values["oper"], FieldValue::String("up".into()));
    assert_eq!(ev.values["util"], FieldValue::Float(0.25));
    assert_eq!(ev.tags["port"], "1");
}

#[test]
fn builder_collects_tags_and_values() {
    let ev = UpdateEvent::new("cpu", 7)
        .with_tag("host", "r1")
        .with_value("idle", 99u64);
    assert_eq!(ev.tags.len(), 1);
    assert_eq!(ev.values["idle"], FieldValue::UInt(99));
}
