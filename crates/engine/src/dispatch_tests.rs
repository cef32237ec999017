// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::coordinator::reset_coordinator;
use std::time::Duration;
use tsink_core::test_support::counter_event;

#[tokio::test]
async fn delivers_while_healthy() {
    let (_trigger, watch) = reset_coordinator();
    let (queue, rx) = dispatch_queue(4, watch, CancellationToken::new());

    assert_eq!(queue.send(counter_event("1", 7, 1)).await, Delivery::Delivered);
    let event = rx.recv().await.unwrap();
    assert_eq!(event.timestamp, 1);
}

#[tokio::test]
async fn drops_immediately_while_resetting() {
    let (trigger, watch) = reset_coordinator();
    let (queue, _rx) = dispatch_queue(4, watch, CancellationToken::new());
    trigger.fire_failure();

    assert_eq!(queue.send(counter_event("1", 7, 1)).await, Delivery::Reset);
}

#[tokio::test]
async fn drops_after_cancel() {
    let (_trigger, watch) = reset_coordinator();
    let cancel = CancellationToken::new();
    let (queue, _rx) = dispatch_queue(4, watch, cancel.clone());
    cancel.cancel();

    assert_eq!(queue.send(counter_event("1", 7, 1)).await, Delivery::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn blocked_producer_released_by_reset() {
    let (trigger, watch) = reset_coordinator();
    let (queue, _rx) = dispatch_queue(1, watch, CancellationToken::new());
    assert!(queue.send(counter_event("1", 0, 0)).await.is_delivered());

    let producer = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.send(counter_event("1", 1, 1)).await })
    };
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!producer.is_finished(), "queue is full, producer waits");

    trigger.fire_failure();
    assert_eq!(producer.await.unwrap(), Delivery::Reset);
}

#[tokio::test(start_paused = true)]
async fn blocked_producer_released_by_cancel() {
    let (_trigger, watch) = reset_coordinator();
    let cancel = CancellationToken::new();
    let (queue, _rx) = dispatch_queue(1, watch, cancel.clone());
    assert!(queue.send(counter_event("1", 0, 0)).await.is_delivered());

    let producer = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.send(counter_event("1", 1, 1)).await })
    };
    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();
    assert_eq!(producer.await.unwrap(), Delivery::Cancelled);
}

#[tokio::test]
async fn receivers_share_one_queue() {
    let (_trigger, watch) = reset_coordinator();
    let (queue, rx) = dispatch_queue(8, watch, CancellationToken::new());
    let other = rx.clone();

    for i in 0..4 {
        assert!(queue.send(counter_event("1", i, i as i64)).await.is_delivered());
    }
    drop(queue);

    let mut seen = Vec::new();
    while let Some(ev) = rx.recv().await {
        seen.push(ev.timestamp);
        if let Some(ev) = other.recv().await {
            seen.push(ev.timestamp);
        }
    }
    assert_eq!(seen, vec![0, 1, 2, 3]);
}
