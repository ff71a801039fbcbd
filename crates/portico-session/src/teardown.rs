//! Teardown signal for a controller.
//!
//! When the component that owns a controller goes away (page unmount),
//! an in-flight provider directory fetch must not write into state nobody
//! is looking at any more. [`TeardownHandle`] is the switch: once flipped,
//! [`SessionController::initialize`](crate::SessionController::initialize)
//! abandons the fetch without touching state.
//!
//! Built on `tokio::sync::watch` so the flag is level-triggered: tearing
//! down *before* `initialize` starts cancels it just the same.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable switch that marks a controller as torn down.
#[derive(Debug, Clone)]
pub struct TeardownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl TeardownHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Marks the controller as torn down. Idempotent.
    pub fn teardown(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("controller torn down");
        }
    }

    /// Returns `true` once [`teardown`](Self::teardown) was called.
    pub fn is_torn_down(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the controller is torn down.
    pub(crate) async fn torn_down(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so `wait_for` can only
        // return once the flag is set.
        let _ = rx.wait_for(|torn| *torn).await;
    }
}
