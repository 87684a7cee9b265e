//! One-shot and continuous scheduling of batch passes.
//!
//! The control loop is an explicit state machine (`Idle → Running →
//! Idle | Stopped`) with a pollable stop signal checked only at pass
//! boundaries, instead of an uncontrolled blocking sleep: a pass in flight
//! always completes and its summary is always reported before the scheduler
//! considers stopping.

use std::time::Duration;

use tokio::sync::watch;

use crate::batch::{BatchCoordinator, SyncSummary};

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not currently executing a pass.
    Idle,
    /// A pass is in flight.
    Running,
    /// The stop signal was honored; no further passes will run.
    Stopped,
}

/// Drives the [`BatchCoordinator`] over a fixed symbol scope.
pub struct UpdateScheduler {
    coordinator: BatchCoordinator,
    symbols: Vec<String>,
    interval: Duration,
    state: SchedulerState,
}

impl UpdateScheduler {
    /// Builds a scheduler over `symbols`. `interval` is measured from the
    /// end of one pass to the start of the next (no drift correction).
    pub fn new(coordinator: BatchCoordinator, symbols: Vec<String>, interval: Duration) -> Self {
        Self {
            coordinator,
            symbols,
            interval,
            state: SchedulerState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Executes exactly one pass and returns to [`SchedulerState::Idle`].
    pub async fn run_once(&mut self, force: bool) -> SyncSummary {
        self.state = SchedulerState::Running;
        let summary = self.coordinator.run(&self.symbols, force).await;
        self.state = SchedulerState::Idle;
        summary
    }

    /// Runs passes until `stop` is raised. Failures within a pass are
    /// logged and never exit the loop; the stop signal is honored only
    /// between passes.
    pub async fn run_continuous(&mut self, mut stop: watch::Receiver<bool>) {
        loop {
            self.state = SchedulerState::Running;
            let summary = self.coordinator.run(&self.symbols, false).await;
            if summary.has_failures() {
                tracing::warn!(
                    failures = summary.failure_count(),
                    "pass finished with failures; continuing",
                );
            }
            tracing::info!("pass complete:\n{summary}");
            self.state = SchedulerState::Idle;

            // A stop raised mid-pass is seen here, at the boundary.
            if *stop.borrow() {
                break;
            }

            tracing::info!(interval = ?self.interval, "sleeping until next pass");
            if self.wait_for_next_pass(&mut stop).await {
                break;
            }
        }
        self.state = SchedulerState::Stopped;
        tracing::info!("scheduler stopped");
    }

    /// Sleeps one interval, waking early for a stop. Returns `true` when a
    /// stop was requested (or every sender is gone).
    async fn wait_for_next_pass(&self, stop: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = stop.changed() => match changed {
                    Err(_) => return true,
                    Ok(()) if *stop.borrow() => return true,
                    Ok(()) => {}
                },
            }
        }
    }
}
