//! Message types for actor communication
//!
//! Actors publish their results into [`SnapshotState`](crate::SnapshotState)
//! rather than onto channels; the only messages are control commands sent to
//! a specific actor through its handle.
//!
//! Shutdown is not a command. It goes through the actor's
//! `CancellationToken` so it also interrupts an in-flight probe or read.

use tokio::sync::oneshot;

use crate::monitors::health::HealthState;

/// Commands that can be sent to the StatusMonitorActor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Probe immediately instead of waiting for the next cycle
    ///
    /// The regular schedule restarts from the manual check.
    CheckNow {
        /// Channel to send the classified state back
        respond_to: oneshot::Sender<HealthState>,
    },
}

/// Commands that can be sent to the StatsAggregatorActor
#[derive(Debug)]
pub enum AggregatorCommand {
    /// Rebuild the snapshot immediately
    ///
    /// Responds with the storage error if the cycle had to be skipped.
    RefreshNow {
        respond_to: oneshot::Sender<anyhow::Result<()>>,
    },
}
