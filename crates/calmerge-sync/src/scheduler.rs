//! Periodic background sync.
//!
//! This module provides a scheduler that runs sync passes with support for:
//! - Configurable sync intervals
//! - A random spread around the interval
//! - Doubling retry delays while every enabled source is failing
//! - Commands (sync now, pause, resume, stop) over a channel

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::orchestrator::SyncReport;

/// Delay schedule after passes where every source failed: doubles from
/// `first` and stays at `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub first: Duration,
    pub ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300))
    }
}

impl RetryPolicy {
    pub fn new(first: Duration, ceiling: Duration) -> Self {
        Self {
            first,
            ceiling: ceiling.max(first),
        }
    }

    /// Retry delay after `failed_passes` fully failed passes in a row, or
    /// `None` when the last pass was not a full failure.
    pub fn delay_after(&self, failed_passes: u32) -> Option<Duration> {
        let doublings = failed_passes.checked_sub(1)?;
        let factor = 2u32.checked_pow(doublings).unwrap_or(u32::MAX);
        Some(self.first.saturating_mul(factor).min(self.ceiling))
    }
}

/// Timing of scheduled passes.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub sync_interval: Duration,
    /// Timed passes land anywhere in `sync_interval ± spread`.
    pub spread: Duration,
    pub retry: RetryPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl SchedulerConfig {
    /// Spread defaults to a tenth of the interval.
    pub fn new(sync_interval: Duration) -> Self {
        Self {
            sync_interval,
            spread: sync_interval / 10,
            retry: RetryPolicy::default(),
        }
    }

    /// Builder: set the spread, capped at the interval itself.
    pub fn with_spread(mut self, spread: Duration) -> Self {
        self.spread = spread.min(self.sync_interval);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Delay before the next pass, given the current run of fully failed
    /// passes.
    pub fn delay_for(&self, failed_passes: u32) -> Duration {
        match self.retry.delay_after(failed_passes) {
            Some(retry) => retry,
            None => self.spread_interval(),
        }
    }

    fn spread_interval(&self) -> Duration {
        if self.spread.is_zero() {
            return self.sync_interval;
        }
        let spread = self.spread.as_secs_f64();
        let offset = rand::rng().random_range(-spread..=spread);
        Duration::from_secs_f64((self.sync_interval.as_secs_f64() + offset).max(0.0))
    }
}

/// Commands accepted by a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Run a pass now, even while paused.
    SyncNow,
    /// Skip timed passes until resumed.
    Pause,
    Resume,
    Stop,
}

/// Scheduler state shared with handles.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub paused: bool,
    /// Passes in a row where every enabled source failed.
    pub consecutive_failures: u32,
    /// Last pass where at least one source succeeded (or none were enabled).
    pub last_sync: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    /// Failure summary of the last fully failed pass.
    pub last_error: Option<String>,
    /// Number of passes run.
    pub passes: u64,
    /// Merged event count of the last pass.
    pub last_event_count: usize,
    /// Sources that failed in the last pass.
    pub last_failed_sources: Vec<String>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one pass result into the state.
    pub fn record(&mut self, report: &SyncReport) {
        let now = Utc::now();
        self.passes += 1;
        self.last_attempt = Some(now);
        self.last_event_count = report.events.len();
        self.last_failed_sources = report
            .failed_sources()
            .into_iter()
            .map(String::from)
            .collect();

        if report.all_failed() {
            self.consecutive_failures += 1;
            self.last_error = Some(
                report
                    .failures
                    .iter()
                    .map(|f| format!("{}: {}", f.source_id, f.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        } else {
            self.consecutive_failures = 0;
            self.last_sync = Some(now);
            self.last_error = None;
        }
    }

    /// Time since the last successful pass.
    pub fn time_since_sync(&self) -> Option<Duration> {
        self.last_sync.map(|last| {
            let elapsed = Utc::now() - last;
            elapsed.to_std().unwrap_or_default()
        })
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Runs sync passes on an interval until stopped.
pub struct SyncScheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl SyncScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: Arc::new(RwLock::new(SchedulerState::new())),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    pub fn state(&self) -> SharedSchedulerState {
        self.state.clone()
    }

    /// Runs the loop. The first pass happens immediately.
    ///
    /// `sync_fn` performs one pass; a report where every enabled source
    /// failed switches to the retry delays instead of the regular interval.
    pub async fn run<F, Fut>(self, sync_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SyncReport> + Send,
    {
        let Self {
            config,
            state,
            command_tx,
            mut command_rx,
        } = self;
        // Only handles keep the channel open from here on.
        drop(command_tx);

        info!(
            interval_secs = config.sync_interval.as_secs(),
            "scheduler started"
        );

        run_pass(&state, &sync_fn).await;

        loop {
            let delay = next_delay(&config, &state).await;
            debug!(delay_secs = delay.as_secs(), "scheduling next sync");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if state.read().await.paused {
                        debug!("scheduler paused, skipping sync");
                        continue;
                    }
                    run_pass(&state, &sync_fn).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("received SyncNow command");
                            run_pass(&state, &sync_fn).await;
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!("scheduler paused");
                            state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!("scheduler resumed");
                            state.write().await.paused = false;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn next_delay(config: &SchedulerConfig, state: &SharedSchedulerState) -> Duration {
    let failed_passes = state.read().await.consecutive_failures;
    let delay = config.delay_for(failed_passes);
    if failed_passes > 0 {
        debug!(failed_passes, retry_secs = delay.as_secs(), "retrying after failed pass");
    }
    delay
}

async fn run_pass<F, Fut>(state: &SharedSchedulerState, sync_fn: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = SyncReport>,
{
    debug!("starting scheduled sync");
    let report = sync_fn().await;
    if report.all_failed() {
        warn!(failed = report.failures.len(), "every source failed");
    } else {
        info!(
            events = report.events.len(),
            failed = report.failures.len(),
            "scheduled sync completed"
        );
    }
    state.write().await.record(&report);
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    async fn send(&self, command: SchedulerCommand) -> SyncResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SyncError::SchedulerStopped)
    }

    /// Triggers an immediate pass.
    pub async fn sync_now(&self) -> SyncResult<()> {
        self.send(SchedulerCommand::SyncNow).await
    }

    pub async fn pause(&self) -> SyncResult<()> {
        self.send(SchedulerCommand::Pause).await
    }

    pub async fn resume(&self) -> SyncResult<()> {
        self.send(SchedulerCommand::Resume).await
    }

    pub async fn stop(&self) -> SyncResult<()> {
        self.send(SchedulerCommand::Stop).await
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}
