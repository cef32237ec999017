// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    seconds      = { "30s",   Duration::from_secs(30) },
    secs_word    = { "30secs", Duration::from_secs(30) },
    bare_number  = { "10",    Duration::from_secs(10) },
    millis       = { "500ms", Duration::from_millis(500) },
    minutes      = { "5m",    Duration::from_secs(300) },
    hours        = { "1h",    Duration::from_secs(3600) },
    padded       = { " 2s ",  Duration::from_secs(2) },
)]
fn parses(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[yare::parameterized(
    empty          = { "" },
    unknown_suffix = { "5w" },
    no_number      = { "s" },
    fractional     = { "1.5s" },
    past_one_year  = { "8761h" },
    huge_hours     = { "5000000000000000h" },
    huge_millis    = { "18446744073709551615ms" },
)]
fn rejects(input: &str) {
    assert!(parse_duration(input).is_err());
}

#[yare::parameterized(
    zero       = { Duration::ZERO,              "0s" },
    ten_secs   = { Duration::from_secs(10),     "10s" },
    two_mins   = { Duration::from_secs(120),    "2m" },
    one_hour   = { Duration::from_secs(3600),   "1h" },
    half_sec   = { Duration::from_millis(500),  "500ms" },
    odd_millis = { Duration::from_millis(1500), "1500ms" },
)]
fn formats(input: Duration, expected: &str) {
    assert_eq!(format_duration(input), expected);
    assert_eq!(parse_duration(expected).unwrap(), input);
}

#[derive(serde::Deserialize)]
struct Holder {
    #[serde(with = "serde_duration")]
    period: Duration,
}

#[test]
fn deserializes_string_and_integer() {
    let h: Holder = serde_json::from_str(r#"{"period": "30s"}"#).unwrap();
    assert_eq!(h.period, Duration::from_secs(30));

    let h: Holder = serde_json::from_str(r#"{"period": 15}"#).unwrap();
    assert_eq!(h.period, Duration::from_secs(15));

    assert!(serde_json::from_str::<Holder>(r#"{"period": -1}"#).is_err());
    assert!(serde_json::from_str::<Holder>(r#"{"period": "soon"}"#).is_err());
}

#[test]
fn longest_accepted_duration_is_one_year() {
    assert_eq!(parse_duration("8760h").unwrap(), MAX_DURATION);

    let h: Holder = serde_json::from_str(r#"{"period": 31536000}"#).unwrap();
    assert_eq!(h.period, MAX_DURATION);
    assert!(serde_json::from_str::<Holder>(r#"{"period": 31536001}"#).is_err());
    assert!(serde_json::from_str::<Holder>(r#"{"period": 18446744073709551615}"#).is_err());
}
