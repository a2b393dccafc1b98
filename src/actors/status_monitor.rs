//! StatusMonitorActor - Tracks whether the messenger server answers
//!
//! This actor probes the configured MSNP endpoint on a fixed cadence and
//! publishes the classified health into the shared snapshot state.
//!
//! ## Message Flow
//!
//! ```text
//! Probe → Classify (ok/slow/down) → Publish ServerStatus → Sleep(interval) ─┐
//!   ↑                                                                       │
//!   └───────────────────────────────────────────────────────────────────────┘
//!        Commands (CheckNow) · CancellationToken (shutdown)
//! ```
//!
//! Probe failures of any kind become `down`; they never stop the loop.
//! Cancellation is checked at every suspension point and leaves the last
//! published status untouched.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::ProbeConfig;
use crate::monitors::health::{HealthState, ServerStatus};
use crate::monitors::probe::ProtocolProbe;
use crate::state::SnapshotState;

use super::messages::MonitorCommand;

/// Actor that owns the status slot of the snapshot state
pub struct StatusMonitorActor {
    probe: ProtocolProbe,

    /// Responses at or beyond this are `slow`
    slow_after: Duration,

    /// Pause between the end of one cycle and the start of the next
    interval: Duration,

    state: Arc<SnapshotState>,

    command_rx: mpsc::Receiver<MonitorCommand>,

    cancel: CancellationToken,

    /// Last classified state, for transition logging
    last_state: HealthState,
}

impl StatusMonitorActor {
    pub fn new(
        config: &ProbeConfig,
        state: Arc<SnapshotState>,
        command_rx: mpsc::Receiver<MonitorCommand>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            probe: ProtocolProbe::new(config.host.clone(), config.port, config.timeout()),
            slow_after: config.slow_after(),
            interval: config.interval(),
            state,
            command_rx,
            cancel,
            last_state: HealthState::Unknown,
        }
    }

    /// Run the actor's main loop until the cancellation token fires
    #[instrument(skip(self), fields(target = %self.probe.target()))]
    pub async fn run(mut self) {
        info!("starting status monitor");

        'cycles: loop {
            if !self.cycle().await {
                break;
            }

            let pause = sleep(self.interval);
            tokio::pin!(pause);

            loop {
                tokio::select! {
                    biased;

                    _ = self.cancel.cancelled() => break 'cycles,

                    _ = &mut pause => break,

                    Some(cmd) = self.command_rx.recv() => match cmd {
                        MonitorCommand::CheckNow { respond_to } => {
                            debug!("received CheckNow command");
                            if !self.cycle().await {
                                break 'cycles;
                            }
                            let _ = respond_to.send(self.last_state);
                            pause.as_mut().reset(Instant::now() + self.interval);
                        }
                    },
                }
            }
        }

        debug!("status monitor stopped");
    }

    /// Run one probe cycle, returning `false` if it was cancelled
    async fn cycle(&mut self) -> bool {
        let state = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return false,
            state = self.perform_check() => state,
        };

        self.last_state = state;
        true
    }

    /// Probe, classify and publish
    ///
    /// Publishing is the last step, so a cycle dropped mid-probe publishes
    /// nothing.
    async fn perform_check(&self) -> HealthState {
        let result = self.probe.run().await;
        if let Err(e) = &result {
            warn!("probe failed: {e:#}");
        }

        let state = HealthState::classify(&result, self.slow_after);
        self.state.publish_status(ServerStatus::new(state, Utc::now()));

        if state != self.last_state {
            info!("server state changed: {} -> {}", self.last_state, state);
        } else {
            debug!("server state unchanged: {state}");
        }

        state
    }
}

/// Handle for controlling a StatusMonitorActor
pub struct StatusMonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StatusMonitorHandle {
    /// Spawn a new status monitor
    ///
    /// The actor stops when `cancel` (or [`shutdown`](Self::shutdown)) fires.
    pub fn spawn(config: &ProbeConfig, state: Arc<SnapshotState>, cancel: CancellationToken) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let actor = StatusMonitorActor::new(config, state, cmd_rx, cancel.clone());
        let task = tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            cancel,
            task,
        }
    }

    /// Probe immediately and return the classified state
    pub async fn check_now(&self) -> Result<HealthState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::CheckNow { respond_to: tx })
            .await?;

        Ok(rx.await?)
    }

    /// Cancel the actor and wait for it to stop
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.task.await?;
        Ok(())
    }

    /// Whether the actor task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// ============================================================================
// Tests
// ============================================================================
