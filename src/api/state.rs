//! API shared state

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::state::SnapshotState;
use crate::tokens::AuthTokenService;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Snapshots published by the background actors
    pub snapshots: Arc<SnapshotState>,

    /// Process-wide token registry
    pub tokens: Arc<AuthTokenService>,

    /// When the hub started, reported by the health endpoint
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(snapshots: Arc<SnapshotState>, tokens: Arc<AuthTokenService>) -> Self {
        Self {
            snapshots,
            tokens,
            started_at: Utc::now(),
        }
    }
}
