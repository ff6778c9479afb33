use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-shot, many-observer stop broadcast.
///
/// Workers poll [`StopSignal::is_stopped`] at the top of every iteration; tasks that sleep can
/// race [`StopSignal::wait`] against their timer instead.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub async fn wait(&self) {
        loop {
            // Register interest before checking the flag so a concurrent `stop()` is never missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_immediately_once_stopped() {
        let signal = StopSignal::new();
        signal.stop();
        assert!(signal.is_stopped());

        let res = tokio::time::timeout(Duration::from_millis(100), signal.wait()).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn stop_wakes_every_waiter() {
        let signal = Arc::new(StopSignal::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let signal = signal.clone();
            handles.push(tokio::spawn(async move { signal.wait().await }));
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!signal.is_stopped());
        signal.stop();

        for h in handles {
            let res = tokio::time::timeout(Duration::from_secs(1), h).await;
            assert!(matches!(res, Ok(Ok(()))));
        }
    }
}
