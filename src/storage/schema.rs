//! Row types read from the stats database
//!
//! The stats database is written by the messenger server itself. This crate
//! only reads three tables:
//!
//! | table                 | columns                                                        |
//! |-----------------------|----------------------------------------------------------------|
//! | `t_stats_current`     | `key`, `date_updated`, `value` (JSON)                          |
//! | `t_client`            | `id`, `data` (JSON `{program, version, via}`)                  |
//! | `t_stats_hour_client` | `hour`, `client_id`, `users_active`, `messages_sent`, `messages_received` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the "currently logged in" counter in `t_stats_current`
pub const LOGGED_IN_KEY: &str = "logged_in";

/// A keyed current value and when the server last refreshed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentCounter {
    pub value: i64,
    pub updated_at: DateTime<Utc>,
}

/// How a client reached the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    /// Plain TCP connection from a desktop client
    Direct,
    /// MSN TV set-top boxes
    WebTv,
    /// Any other gateway (HTTP polling, web clients, ...)
    Other(String),
}

impl From<String> for Channel {
    fn from(via: String) -> Self {
        match via.as_str() {
            "direct" => Channel::Direct,
            "webtv" => Channel::WebTv,
            _ => Channel::Other(via),
        }
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Direct => "direct".to_string(),
            Channel::WebTv => "webtv".to_string(),
            Channel::Other(via) => via,
        }
    }
}

/// Client directory entry (`t_client.data`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Program family, e.g. `msn` or `ymsg`
    pub program: String,

    /// Self-reported version; legacy MSN clients only send their dialect (`MSNP7`)
    pub version: String,

    pub via: Channel,
}

impl ClientInfo {
    pub fn new(program: impl Into<String>, version: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
            via: Channel::from(via.into()),
        }
    }
}

/// One row of `t_stats_hour_client`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyStatsRow {
    /// Whole hours since the Unix epoch
    pub hour: i64,
    pub client_id: i64,
    pub users_active: i64,
    pub messages_sent: i64,
    pub messages_received: i64,
}
