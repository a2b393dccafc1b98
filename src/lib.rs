//! Background health monitoring and stats aggregation for a messenger site
//!
//! Two independent loops run for the life of the process:
//!
//! - [`actors::status_monitor`] probes the messenger server with an MSNP
//!   handshake and publishes a [`ServerStatus`]
//! - [`actors::stats_aggregator`] rebuilds the hourly usage dashboard from the
//!   stats database and publishes a [`StatsSnapshot`]
//!
//! Request handlers read both through [`SnapshotState`] and issue one-shot
//! credentials through [`tokens::AuthTokenService`].

pub mod actors;
pub mod api;
pub mod config;
pub mod monitors;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tokens;
pub mod util;

pub use monitors::health::{HealthState, ServerStatus};
pub use state::SnapshotState;
pub use stats::{HourGroup, HourlyRecord, StatsSnapshot};
