//! Read contract of the stats database
//!
//! This module defines the `StatsSource` trait consumed by the stats
//! aggregator. Sources are read-only; the messenger server owns the data.

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::{ClientInfo, CurrentCounter, HourlyStatsRow};

/// Trait for stats database readers
///
/// ## Resource handling
///
/// Each method acquires whatever handle it needs (pooled connection, lock
/// guard) for the duration of that single read and releases it before
/// returning, on success and on error alike. There is no ambient session
/// shared between calls.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as they are shared with the
/// aggregator task.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Look up a keyed current value
    ///
    /// Returns `None` if the key has never been written. Freshness is judged
    /// by the caller from `updated_at`.
    async fn current_counter(&self, key: &str) -> StorageResult<Option<CurrentCounter>>;

    /// Read the whole client directory, keyed by client id
    async fn clients(&self) -> StorageResult<HashMap<i64, ClientInfo>>;

    /// Read every hourly row with `hour >= threshold_hour`
    ///
    /// No ordering is guaranteed.
    async fn hourly_stats_since(&self, threshold_hour: i64) -> StorageResult<Vec<HourlyStatsRow>>;

    /// Human-readable description for startup logs
    fn describe(&self) -> String;
}
