//! One-shot readiness signal for the remote client.
//!
//! The client may come up late or never (no credentials configured), so
//! startup waits on [`ReadySignal::wait`] with a bound and then carries on in
//! local-only mode.

use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Create a connected notifier/signal pair in the unresolved state.
pub fn readiness() -> (ReadyNotifier, ReadySignal) {
    let (tx, rx) = watch::channel(None);
    (ReadyNotifier { tx }, ReadySignal { rx })
}

#[derive(Debug)]
pub struct ReadyNotifier {
    tx: watch::Sender<Option<bool>>,
}

impl ReadyNotifier {
    /// Resolve the signal. `false` means the client could not be set up.
    pub fn mark(&self, ready: bool) {
        self.tx.send_replace(Some(ready));
    }
}

#[derive(Debug, Clone)]
pub struct ReadySignal {
    rx: watch::Receiver<Option<bool>>,
}

impl ReadySignal {
    /// A signal that has already fired.
    pub fn resolved(ready: bool) -> Self {
        let (_tx, rx) = watch::channel(Some(ready));
        Self { rx }
    }

    /// Current state without waiting. Unresolved reads as not ready.
    pub fn is_ready(&self) -> bool {
        (*self.rx.borrow()).unwrap_or(false)
    }

    /// Wait up to `timeout` for the signal to fire and return its value.
    ///
    /// On expiry the current state is returned, which is `false` unless the
    /// signal fired in the meantime. A notifier dropped without firing also
    /// yields `false`.
    pub async fn wait(&self, timeout: Duration) -> bool {
        if let Some(ready) = *self.rx.borrow() {
            return ready;
        }
        let mut rx = self.rx.clone();
        let ready = match tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await {
            Ok(Ok(value)) => (*value).unwrap_or(false),
            Ok(Err(_)) => {
                debug!("ready notifier dropped before firing");
                false
            }
            Err(_) => {
                debug!(timeout_ms = timeout.as_millis() as u64, "ready wait timed out");
                self.is_ready()
            }
        };
        ready
    }
}
