//! Foreground/background credential refresh.
//!
//! The host runtime owns a [`RefreshLifecycle`] and calls
//! [`on_foreground`](RefreshLifecycle::on_foreground) and
//! [`on_background`](RefreshLifecycle::on_background) on its own transitions.
//! While in the foreground a background task refreshes credentials on a fixed
//! interval; in the background the task is torn down.

use std::sync::Arc;
use std::time::Duration;

use calmerge_providers::{BoxFuture, ProviderResult};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Renews whatever bearer credentials the sources depend on.
pub trait CredentialRefresher: Send + Sync {
    fn refresh(&self) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Explicit owner of the background refresh loop.
pub struct RefreshLifecycle {
    refresher: Arc<dyn CredentialRefresher>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshLifecycle {
    pub const DEFAULT_INTERVAL_SECS: u64 = 45 * 60;

    pub fn new(refresher: Arc<dyn CredentialRefresher>) -> Self {
        Self {
            refresher,
            interval: Duration::from_secs(Self::DEFAULT_INTERVAL_SECS),
            task: None,
        }
    }

    /// Builder: set the refresh interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Starts the refresh loop if it is not already running.
    ///
    /// The first refresh happens immediately. Must be called from within a
    /// tokio runtime.
    pub fn on_foreground(&mut self) {
        if self.is_active() {
            debug!("credential refresh already active");
            return;
        }

        let refresher = Arc::clone(&self.refresher);
        let interval = self.interval;
        info!(interval_secs = interval.as_secs(), "credential refresh enabled");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match refresher.refresh().await {
                    Ok(()) => debug!("credentials refreshed"),
                    Err(e) => warn!(error = %e, "credential refresh failed"),
                }
            }
        }));
    }

    /// Stops the refresh loop. Calling it while inactive does nothing.
    pub fn on_background(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("credential refresh suspended");
        }
    }

    /// True while the refresh loop is running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RefreshLifecycle {
    fn drop(&mut self) {
        self.on_background();
    }
}

impl std::fmt::Debug for RefreshLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshLifecycle")
            .field("interval", &self.interval)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calmerge_providers::ProviderError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicU32,
        fail: bool,
    }

    impl CredentialRefresher for CountingRefresher {
        fn refresh(&self) -> BoxFuture<'_, ProviderResult<()>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    Err(ProviderError::authentication("refresh token revoked"))
                } else {
                    Ok(())
                }
            })
        }
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn foreground_refreshes_on_interval() {
        let refresher = Arc::new(CountingRefresher::default());
        let mut lifecycle =
            RefreshLifecycle::new(refresher.clone()).with_interval(Duration::from_secs(60));

        assert!(!lifecycle.is_active());
        lifecycle.on_foreground();
        settle().await;
        assert!(lifecycle.is_active());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn foreground_is_idempotent() {
        let refresher = Arc::new(CountingRefresher::default());
        let mut lifecycle =
            RefreshLifecycle::new(refresher.clone()).with_interval(Duration::from_secs(60));

        lifecycle.on_foreground();
        lifecycle.on_foreground();
        settle().await;

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn background_suspends() {
        let refresher = Arc::new(CountingRefresher::default());
        let mut lifecycle =
            RefreshLifecycle::new(refresher.clone()).with_interval(Duration::from_secs(60));

        lifecycle.on_foreground();
        settle().await;
        lifecycle.on_background();
        lifecycle.on_background();
        settle().await;
        assert!(!lifecycle.is_active());

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);

        lifecycle.on_foreground();
        settle().await;
        assert!(lifecycle.is_active());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_loop_alive() {
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicU32::new(0),
            fail: true,
        });
        let mut lifecycle =
            RefreshLifecycle::new(refresher.clone()).with_interval(Duration::from_secs(10));

        lifecycle.on_foreground();
        settle().await;
        tokio::time::advance(Duration::from_secs(11)).await;
        settle().await;

        assert!(lifecycle.is_active());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }
}
