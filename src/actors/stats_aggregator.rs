//! StatsAggregatorActor - Rebuilds the usage dashboard
//!
//! ## Message Flow
//!
//! ```text
//! Read logged_in ─► Read clients ─► Read hourly rows (last N hours)
//!        └──────────────┬──────────────────┘
//!                       ▼
//!        Build StatsSnapshot (label, sort, group) ─► Publish ─► Sleep(interval)
//! ```
//!
//! A failed read skips the whole cycle: the previously published snapshot
//! stays in place and the loop carries on at the next interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::StatsConfig;
use crate::state::SnapshotState;
use crate::stats::{StatsSnapshot, hour_bucket, logged_in_count};
use crate::storage::schema::LOGGED_IN_KEY;
use crate::storage::{StatsSource, StorageResult};

use super::messages::AggregatorCommand;

/// Read everything one snapshot needs and build it
///
/// `window_hours` is inclusive of the bucket exactly that many hours back;
/// an oversized window saturates and reads every row.
pub async fn collect_snapshot(
    source: &dyn StatsSource,
    now: DateTime<Utc>,
    window_hours: i64,
    fresh_for: Duration,
) -> StorageResult<StatsSnapshot> {
    let counter = source.current_counter(LOGGED_IN_KEY).await?;
    let logged_in = logged_in_count(counter.as_ref(), now, fresh_for);

    let clients = source.clients().await?;

    let threshold = hour_bucket(now).saturating_sub(window_hours);
    let rows = source.hourly_stats_since(threshold).await?;
    trace!("read {} hourly rows since hour {threshold}", rows.len());

    Ok(StatsSnapshot::build(logged_in, &clients, &rows, now))
}

/// Actor that owns the stats slot of the snapshot state
pub struct StatsAggregatorActor {
    source: Arc<dyn StatsSource>,

    state: Arc<SnapshotState>,

    interval: Duration,

    window_hours: i64,

    /// Maximum age of the logged-in counter
    fresh_for: Duration,

    command_rx: mpsc::Receiver<AggregatorCommand>,

    cancel: CancellationToken,
}

impl StatsAggregatorActor {
    pub fn new(
        config: &StatsConfig,
        source: Arc<dyn StatsSource>,
        state: Arc<SnapshotState>,
        command_rx: mpsc::Receiver<AggregatorCommand>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            state,
            interval: config.interval(),
            window_hours: config.window_hours,
            fresh_for: config.fresh_for(),
            command_rx,
            cancel,
        }
    }

    /// Run the actor's main loop until the cancellation token fires
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("starting stats aggregator on {}", self.source.describe());

        'cycles: loop {
            if self.cycle().await.is_none() {
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
                        AggregatorCommand::RefreshNow { respond_to } => {
                            debug!("received RefreshNow command");
                            let Some(result) = self.cycle().await else {
                                break 'cycles;
                            };
                            let _ = respond_to.send(result);
                            pause.as_mut().reset(Instant::now() + self.interval);
                        }
                    },
                }
            }
        }

        debug!("stats aggregator stopped");
    }

    /// Run one aggregation, `None` if it was cancelled
    async fn cycle(&self) -> Option<Result<()>> {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            result = self.aggregate() => result,
        };

        if let Err(e) = &result {
            warn!("skipping stats cycle, keeping previous snapshot: {e:#}");
        }
        Some(result)
    }

    #[instrument(skip(self))]
    async fn aggregate(&self) -> Result<()> {
        let snapshot = collect_snapshot(
            self.source.as_ref(),
            Utc::now(),
            self.window_hours,
            self.fresh_for,
        )
        .await
        .context("failed to read stats")?;

        debug!(
            "aggregated {} hour groups, {} logged in",
            snapshot.by_hour.len(),
            snapshot.logged_in_count
        );
        self.state.publish_stats(snapshot);

        Ok(())
    }
}

/// Handle for controlling a StatsAggregatorActor
pub struct StatsAggregatorHandle {
    sender: mpsc::Sender<AggregatorCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StatsAggregatorHandle {
    /// Spawn a new stats aggregator
    pub fn spawn(
        config: &StatsConfig,
        source: Arc<dyn StatsSource>,
        state: Arc<SnapshotState>,
        cancel: CancellationToken,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let actor = StatsAggregatorActor::new(config, source, state, cmd_rx, cancel.clone());
        let task = tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            cancel,
            task,
        }
    }

    /// Rebuild the snapshot now; errors if the cycle was skipped
    pub async fn refresh_now(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AggregatorCommand::RefreshNow { respond_to: tx })
            .await?;

        rx.await?
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
