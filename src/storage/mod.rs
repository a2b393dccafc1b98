//! Read-only access to the stats database
//!
//! This module provides a trait-based abstraction over the counters the
//! messenger server records (who is logged in, hourly per-client activity).
//!
//! ## Design
//!
//! - **Trait-based**: `StatsSource` allows swapping implementations
//! - **Async**: All reads are async for compatibility with the aggregator task
//! - **Read-only**: Nothing in this crate writes the stats tables
//!
//! ## Sources
//!
//! - **SQLite** (default): The database file shared with the messenger server
//! - **In-Memory** (fallback): For testing, or when no database is configured
//!
//! ## Usage
//!
//! ```no_run
//! use messenger_status::storage::{StatsSource, sqlite::SqliteStatsSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = SqliteStatsSource::open("../server/stats.sqlite").await?;
//!     let clients = source.clients().await?;
//!     println!("{} known clients", clients.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::StatsSource;
pub use error::{StorageError, StorageResult};
pub use schema::{ClientInfo, CurrentCounter, HourlyStatsRow};
