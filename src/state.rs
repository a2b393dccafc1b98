//! Latest published snapshots, shared between the background loops and
//! request handlers
//!
//! Each slot holds an `Arc` to an immutable value. Publishing swaps the
//! pointer in one atomic step, so readers never lock and never see a value
//! that is only partly written. The status monitor is the only writer of the
//! status slot and the stats aggregator the only writer of the stats slot.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::trace;

use crate::monitors::health::ServerStatus;
use crate::stats::StatsSnapshot;

/// Process-wide holder of the latest `ServerStatus` and `StatsSnapshot`
#[derive(Debug, Default)]
pub struct SnapshotState {
    status: ArcSwapOption<ServerStatus>,
    stats: ArcSwapOption<StatsSnapshot>,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest server status, `None` before the first probe completed
    pub fn current_status(&self) -> Option<Arc<ServerStatus>> {
        self.status.load_full()
    }

    /// Latest stats snapshot, `None` before the first successful aggregation
    pub fn current_stats(&self) -> Option<Arc<StatsSnapshot>> {
        self.stats.load_full()
    }

    /// Replace the published status
    pub fn publish_status(&self, status: ServerStatus) {
        trace!("publishing status {}", status.state);
        self.status.store(Some(Arc::new(status)));
    }

    /// Replace the published stats snapshot
    pub fn publish_stats(&self, snapshot: StatsSnapshot) {
        trace!("publishing stats snapshot with {} hour groups", snapshot.by_hour.len());
        self.stats.store(Some(Arc::new(snapshot)));
    }
}
