use chrono::{DateTime, Utc};
use memory_store::MarkerStore;
use murmur_core::CoreError;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// How often a scheduled activity fires: each wait is drawn uniformly
/// from the minute range so runs never fall into a fixed rhythm.
#[derive(Debug, Clone)]
pub struct ActivityCadence {
    pub scope: &'static str,
    pub min_minutes: u64,
    pub max_minutes: u64,
}

impl ActivityCadence {
    pub fn new_post(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            scope: "new_post",
            min_minutes,
            max_minutes,
        }
    }

    pub fn timeline_sweep(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            scope: "timeline_sweep",
            min_minutes,
            max_minutes,
        }
    }

    pub fn draw_interval(&self) -> Duration {
        if self.max_minutes <= self.min_minutes {
            return Duration::from_secs(self.min_minutes * 60);
        }
        let minutes = fastrand::u64(self.min_minutes..=self.max_minutes);
        Duration::from_secs(minutes * 60)
    }
}

/// An activity is due when it has never run, or when at least `interval`
/// has elapsed since the persisted last run. A last-run timestamp in the
/// future reads as "not due" rather than panicking on negative elapsed
/// time.
pub fn is_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now
            .signed_duration_since(last)
            .to_std()
            .map(|elapsed| elapsed >= interval)
            .unwrap_or(false),
    }
}

/// Run `work` forever on a jittered cadence, persisting the last-run
/// marker so a restart picks up the elapsed time instead of firing
/// immediately. The marker is recorded after every attempt, success or
/// failure, so a persistently failing activity still backs off.
pub fn spawn_activity<F, Fut>(
    markers: MarkerStore,
    cadence: ActivityCadence,
    mut work: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let interval = cadence.draw_interval();

            let last = match markers.last_run(cadence.scope).await {
                Ok(last) => last,
                Err(e) => {
                    warn!("Could not read last run for {}: {}", cadence.scope, e);
                    None
                }
            };

            if is_due(last, Utc::now(), interval) {
                info!("Running scheduled activity {}", cadence.scope);
                if let Err(e) = work().await {
                    if e.is_transient() {
                        warn!("Activity {} hit a transient error: {}", cadence.scope, e);
                    } else {
                        error!("Activity {} failed: {}", cadence.scope, e);
                    }
                }
                if let Err(e) = markers.record_run(cadence.scope, Utc::now()).await {
                    warn!("Could not record run of {}: {}", cadence.scope, e);
                }
            } else {
                debug!("Activity {} not due yet", cadence.scope);
            }

            debug!("Next {} check in {:?}", cadence.scope, interval);
            sleep(interval).await;
        }
    })
}
