// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines notification feed.
//!
//! Each line holds one decoded notification plus optional metadata:
//!
//! ```text
//! {"meta":{"subscription-name":"ifcounters","source":"r1:57400"},"timestamp":1700000000000000000,"prefix":"/interfaces/interface[name=eth0]","updates":[{"path":"state/counters/in-octets","value":100}]}
//! ```

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tsink_core::{Meta, Notification};
use tsink_engine::Sink;

#[derive(Debug, Deserialize)]
pub struct FeedRecord {
    #[serde(default)]
    pub meta: Meta,
    #[serde(flatten)]
    pub notification: Notification,
}

/// Counters for one feed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub records: u64,
    pub rejected: u64,
    pub events: u64,
}

/// Parse one feed line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FeedRecord>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Forward records from `reader` into `sink` until EOF or cancellation.
pub async fn run<R>(
    sink: &Sink,
    reader: R,
    cancel: &CancellationToken,
) -> Result<FeedSummary, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();
    let mut line_no = 0u64;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            info!("feed reached end of input");
            break;
        };
        line_no += 1;

        match parse_line(&line) {
            Ok(Some(record)) => {
                summary.records += 1;
                let queued = sink.write(&record.notification, &record.meta).await;
                summary.events += queued as u64;
                debug!(line = line_no, queued, "record forwarded");
            }
            Ok(None) => {}
            Err(e) => {
                summary.rejected += 1;
                warn!(line = line_no, error = %e, "skipping malformed record");
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
