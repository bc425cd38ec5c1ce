//! Shutdown coordination.
//!
//! The signal task triggers once; the HTTP server (and any other subscribed
//! task) sees the broadcast and drains in-flight proxied requests before
//! exiting.

use tokio::sync::broadcast;

/// Broadcast-based shutdown fan-out. Clonable receivers, single trigger.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that completes when [`trigger`](Self::trigger) is called.
    /// Dropping every receiver also closes the channel, so the coordinator
    /// must outlive the server in tests.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the shutdown signal. Idempotent; later calls are no-ops as far
    /// as subscribers are concerned.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
