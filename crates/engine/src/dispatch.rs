// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded event queue shared by all writer workers.
//!
//! Producers never block past a reset: while the backend is down, or if it
//! goes down while a producer waits for queue space, the event is dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tsink_core::UpdateEvent;

use crate::coordinator::ResetWatch;

/// Create the producer and consumer halves of a queue holding `capacity` events.
pub fn dispatch_queue(
    capacity: usize,
    reset: ResetWatch,
    cancel: CancellationToken,
) -> (DispatchQueue, DispatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DispatchQueue { tx, reset, cancel },
        DispatchReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Outcome of handing one event to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Enqueued for a worker
    Delivered,
    /// Dropped because the sink is shutting down
    Cancelled,
    /// Dropped because the backend is down
    Reset,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        self == Delivery::Delivered
    }
}

/// Producer half
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<UpdateEvent>,
    reset: ResetWatch,
    cancel: CancellationToken,
}

impl DispatchQueue {
    /// Enqueue one event, waiting for space unless cancelled or reset.
    pub async fn send(&self, event: UpdateEvent) -> Delivery {
        if self.cancel.is_cancelled() {
            return Delivery::Cancelled;
        }
        let epoch = self.reset.epoch();
        if self.reset.is_resetting() {
            return Delivery::Reset;
        }

        let mut reset = self.reset.clone();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Delivery::Cancelled,
            Some(_) = reset.failed_after(epoch) => Delivery::Reset,
            sent = self.tx.send(event) => match sent {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Cancelled,
            },
        }
    }
}

/// Consumer half; clones compete for events.
#[derive(Clone)]
pub struct DispatchReceiver {
    rx: Arc<Mutex<mpsc::Receiver<UpdateEvent>>>,
}

impl DispatchReceiver {
    /// Next event, or `None` once every producer is gone and the queue drained.
    pub async fn recv(&self) -> Option<UpdateEvent> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
