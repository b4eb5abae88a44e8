use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::provider::{RateProvider, RateSet};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Background task that proactively refreshes the rate cache.
///
/// Every tick invalidates the cache and fetches a fresh rate set, then hands
/// it to the callback. The task stops on `cancel` or when the handle is
/// dropped.
pub struct RefreshTask {
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Spawn on the current tokio runtime. The first refresh happens one
    /// interval from now.
    pub fn spawn<F>(provider: Arc<RateProvider>, every: Duration, on_refresh: F) -> Self
    where
        F: Fn(&RateSet) + Send + Sync + 'static,
    {
        info!("Scheduling rate refresh every {}s", every.as_secs());
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                provider.invalidate();
                let rates = provider.get_rates().await;
                debug!("Periodic refresh completed at {}", rates.fetched_at);
                on_refresh(&rates);
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Rate refresh task cancelled");
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.stop();
    }
}
