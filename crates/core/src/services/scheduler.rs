use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Drives periodic refresh cycles.
///
/// Two states: idle (no task, manual-only) and running (exactly one periodic
/// task with a pending wake-up). Starting a new schedule always cancels the
/// previous task first, so at most one is ever alive.
///
/// Cancellation is cooperative: the flag is checked before each sleep,
/// raced against the sleep itself, and checked again before the tick. A
/// refresh already in flight is never aborted — only the next wake-up is
/// suppressed.
pub struct RefreshScheduler {
    cancel: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            cancel: None,
            handle: None,
        }
    }

    /// True while a periodic task is scheduled.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// (Re)start the periodic schedule. An interval of 0 cancels any pending
    /// task and stays idle — refreshes then happen only on explicit user
    /// action.
    pub fn start<F, Fut>(&mut self, interval_secs: u64, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        if interval_secs == 0 {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            loop {
                if *rx.borrow() {
                    return;
                }
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
                    _ = rx.changed() => {}
                }
                if *rx.borrow() {
                    return;
                }
                tick().await;
            }
        });

        self.cancel = Some(tx);
        self.handle = Some(handle);
    }

    /// Cancel the pending wake-up, if any, and return to idle.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
        self.handle = None;
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
