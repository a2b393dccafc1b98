//! In-memory stats source (no persistence)
//!
//! This source keeps counters in process memory.
//! It's useful for:
//! - Testing without a stats database
//! - Running the hub with `storage: none` (dashboard stays empty)

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::trace;

use super::backend::StatsSource;
use super::error::StorageResult;
use super::schema::{ClientInfo, CurrentCounter, HourlyStatsRow};

#[derive(Debug, Default)]
struct Tables {
    current: HashMap<String, CurrentCounter>,
    clients: HashMap<i64, ClientInfo>,
    hourly: HashMap<(i64, i64), HourlyStatsRow>,
}

/// In-memory stats source
///
/// Writers exist so tests and embedders can feed data; the aggregator only
/// ever reads.
#[derive(Debug, Default)]
pub struct MemoryStatsSource {
    tables: RwLock<Tables>,
}

impl MemoryStatsSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a keyed current value
    pub async fn set_counter(&self, key: &str, value: i64, updated_at: DateTime<Utc>) {
        let mut tables = self.tables.write().await;
        tables
            .current
            .insert(key.to_string(), CurrentCounter { value, updated_at });
    }

    /// Add or replace a client directory entry
    pub async fn insert_client(&self, id: i64, client: ClientInfo) {
        self.tables.write().await.clients.insert(id, client);
    }

    /// Add or replace the row for `(row.hour, row.client_id)`
    pub async fn upsert_hourly(&self, row: HourlyStatsRow) {
        let mut tables = self.tables.write().await;
        tables.hourly.insert((row.hour, row.client_id), row);
    }
}

#[async_trait]
impl StatsSource for MemoryStatsSource {
    async fn current_counter(&self, key: &str) -> StorageResult<Option<CurrentCounter>> {
        trace!("reading in-memory counter {key}");
        Ok(self.tables.read().await.current.get(key).cloned())
    }

    async fn clients(&self) -> StorageResult<HashMap<i64, ClientInfo>> {
        Ok(self.tables.read().await.clients.clone())
    }

    async fn hourly_stats_since(&self, threshold_hour: i64) -> StorageResult<Vec<HourlyStatsRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .hourly
            .values()
            .filter(|row| row.hour >= threshold_hour)
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        "In-Memory stats source".to_string()
    }
}
