use std::time::Duration;

use tokio::task::JoinHandle;

/// One shot timer that can be re-armed or cancelled before it fires.
///
/// Runs on the tokio clock, so a paused test runtime drives it
/// deterministically.
#[derive(Debug, Default)]
pub struct CancelableTimer {
    pending: Option<JoinHandle<()>>,
}

impl CancelableTimer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Arms the timer, replacing whatever was pending.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Returns true if a pending callback was suppressed.
    /// Cancelling an idle or already fired timer is a no-op.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            },
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CancelableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
