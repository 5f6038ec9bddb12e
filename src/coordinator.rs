use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::EMPTY_POLL_WARN_THRESHOLD;
use crate::hid::HidError;
use crate::poll::PollResult;
use crate::sensor::SensorHandle;

#[derive(Debug, thiserror::Error)]
pub enum UpdateFailed {
    #[error("{0}")]
    Hid(#[from] HidError),
    #[error("poll timed out after {0:?}")]
    Timeout(Duration),
    #[error("poll task failed: {0}")]
    Join(String),
    #[error("previous poll cycle still in flight")]
    Busy,
}

type PollTask = JoinHandle<Result<PollResult, HidError>>;

/// What entities see after each refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorState {
    /// Last successful result. Kept across failed refreshes.
    pub data: Option<PollResult>,
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub consecutive_empty: u32,
}

/// Drives poll cycles on a fixed cadence and publishes the outcome.
pub struct UpdateCoordinator {
    sensor: SensorHandle,
    interval: Duration,
    poll_timeout: Option<Duration>,
    state_tx: watch::Sender<CoordinatorState>,
    /// A cycle that outlived its timeout. No new cycle starts until it ends.
    in_flight: Mutex<Option<PollTask>>,
}

impl UpdateCoordinator {
    pub fn new(sensor: SensorHandle, interval: Duration, poll_timeout: Option<Duration>) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::default());
        Self {
            sensor,
            interval,
            poll_timeout,
            state_tx,
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state_tx.borrow().clone()
    }

    async fn fetch(&self) -> Result<PollResult, UpdateFailed> {
        let stale = self
            .in_flight
            .lock()
            .map_err(|_| UpdateFailed::Join("in-flight slot poisoned".into()))?
            .take();
        if let Some(task) = stale {
            if !task.is_finished() {
                self.park(task)?;
                return Err(UpdateFailed::Busy);
            }
            tracing::debug!("Discarding result of timed-out poll cycle");
        }

        let sensor = self.sensor.clone();
        let mut task = tokio::task::spawn_blocking(move || sensor.poll());
        let joined = match self.poll_timeout {
            // The blocking read cannot be interrupted; the task is parked
            // and its result dropped once it returns.
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    self.park(task)?;
                    return Err(UpdateFailed::Timeout(limit));
                }
            },
            None => task.await,
        };
        Ok(joined.map_err(|e| UpdateFailed::Join(e.to_string()))??)
    }

    fn park(&self, task: PollTask) -> Result<(), UpdateFailed> {
        *self
            .in_flight
            .lock()
            .map_err(|_| UpdateFailed::Join("in-flight slot poisoned".into()))? = Some(task);
        Ok(())
    }

    /// Run one poll cycle now and publish the outcome.
    pub async fn refresh(&self) -> Result<PollResult, UpdateFailed> {
        let outcome = self.fetch().await;
        self.state_tx.send_modify(|state| match &outcome {
            Ok(result) => {
                if result.is_empty() {
                    state.consecutive_empty += 1;
                    if state.consecutive_empty == EMPTY_POLL_WARN_THRESHOLD {
                        tracing::warn!(
                            cycles = state.consecutive_empty,
                            "No readings decoded in consecutive poll cycles"
                        );
                    }
                } else {
                    state.consecutive_empty = 0;
                }
                state.data = Some(*result);
                state.last_update_success = true;
                state.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Update failed: {e}");
                state.last_update_success = false;
                state.last_error = Some(e.to_string());
            }
        });
        outcome
    }

    /// Initial refresh at startup. Failure here means the sensor is not
    /// usable and startup should stop.
    pub async fn first_refresh(&self) -> Result<PollResult, UpdateFailed> {
        self.refresh().await.inspect_err(|e| {
            tracing::error!("Initial refresh failed: {e}");
        })
    }

    /// Refresh every `interval` until the task is dropped. Failures are
    /// published and the next tick tries again.
    pub async fn run(&self) {
        tracing::info!(interval = ?self.interval, "Update coordinator running");
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // Already logged and published by refresh.
            let _ = self.refresh().await;
        }
    }
}
