//! Dashboard snapshot model and the grouping rules that build it
//!
//! Raw hourly rows are turned into presentation records, sorted newest hour
//! first and busiest client first, then grouped by their formatted hour:
//!
//! ```text
//! rows ─► HourlyRecord (labels resolved) ─► sort (hour ↓, users ↓) ─► group by hour label
//! ```

pub mod labels;

use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::schema::{ClientInfo, CurrentCounter, HourlyStatsRow};

use labels::{format_client, format_hour};

/// One client's activity within one hour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Whole hours since the Unix epoch
    pub hour_bucket: i64,
    pub formatted_hour: String,
    pub client_label: String,
    pub users_active: i64,
    pub messages_sent: i64,
    pub messages_received: i64,
}

/// All records sharing one formatted hour, busiest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourGroup {
    pub hour_label: String,
    pub records: Vec<HourlyRecord>,
}

/// Dashboard view published by the stats aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Users logged in right now, 0 if the counter is stale
    pub logged_in_count: i64,

    /// Newest hour first
    pub by_hour: Vec<HourGroup>,

    pub generated_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// Build a snapshot from already-read storage data
    pub fn build(
        logged_in_count: i64,
        clients: &HashMap<i64, ClientInfo>,
        rows: &[HourlyStatsRow],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut records = build_records(rows, clients);
        sort_records(&mut records);

        Self {
            logged_in_count,
            by_hour: group_by_hour(records),
            generated_at,
        }
    }

    /// All records in display order
    pub fn records(&self) -> impl Iterator<Item = &HourlyRecord> {
        self.by_hour.iter().flat_map(|group| group.records.iter())
    }
}

/// Epoch-hour bucket containing `at`
pub fn hour_bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(3600)
}

/// Current logged-in count, or 0 when the counter is missing or was last
/// refreshed `fresh_for` or longer ago
pub fn logged_in_count(
    counter: Option<&CurrentCounter>,
    now: DateTime<Utc>,
    fresh_for: Duration,
) -> i64 {
    // A window reaching past the representable range means always fresh
    let Some(cutoff) = chrono::Duration::from_std(fresh_for)
        .ok()
        .and_then(|fresh_for| now.checked_sub_signed(fresh_for))
    else {
        return counter.map_or(0, |c| c.value);
    };

    counter
        .filter(|c| c.updated_at > cutoff)
        .map_or(0, |c| c.value)
}

/// Resolve labels for each raw row
pub fn build_records(rows: &[HourlyStatsRow], clients: &HashMap<i64, ClientInfo>) -> Vec<HourlyRecord> {
    rows.iter()
        .map(|row| HourlyRecord {
            hour_bucket: row.hour,
            formatted_hour: format_hour(row.hour),
            client_label: format_client(clients.get(&row.client_id)),
            users_active: row.users_active,
            messages_sent: row.messages_sent,
            messages_received: row.messages_received,
        })
        .collect()
}

/// Sort by hour descending, then by active users descending
pub fn sort_records(records: &mut [HourlyRecord]) {
    records.sort_by_key(|r| (Reverse(r.hour_bucket), Reverse(r.users_active)));
}

/// Group consecutive records with the same formatted hour
///
/// Group order follows the first occurrence of each hour in `records`.
pub fn group_by_hour(records: Vec<HourlyRecord>) -> Vec<HourGroup> {
    let mut groups: Vec<HourGroup> = Vec::new();

    for record in records {
        match groups.last_mut() {
            Some(group) if group.hour_label == record.formatted_hour => group.records.push(record),
            _ => groups.push(HourGroup {
                hour_label: record.formatted_hour.clone(),
                records: vec![record],
            }),
        }
    }

    groups
}
