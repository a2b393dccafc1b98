//! Long-running background actors
//!
//! Each actor runs as an independent async task, is controlled through a
//! handle, and publishes into the shared [`SnapshotState`](crate::SnapshotState).
//!
//! ## Architecture Overview
//!
//! ```text
//!                     ┌─────────────────┐
//!                     │   Hub (main)    │
//!                     └────────┬────────┘
//!                              │ spawns
//!               ┌──────────────┴──────────────┐
//!               │                             │
//!     ┌─────────▼──────────┐       ┌──────────▼─────────┐
//!     │ StatusMonitorActor │       │ StatsAggregatorActor│
//!     │  (every 120 s)     │       │  (every 300 s)      │
//!     └─────────┬──────────┘       └──────────┬─────────┘
//!               │ publish status              │ publish stats
//!               └──────────────┬──────────────┘
//!                    ┌─────────▼─────────┐
//!                    │   SnapshotState   │ ◄── request handlers (lock-free reads)
//!                    └───────────────────┘
//! ```
//!
//! ## Actor Types
//!
//! - **StatusMonitorActor**: Probes the messenger server and classifies its health
//! - **StatsAggregatorActor**: Rebuilds the hourly usage dashboard from the stats database
//!
//! The two actors never talk to each other.
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: Each actor has an mpsc command channel for manual refreshes
//! 2. **Snapshots**: Results are published by whole-value replacement
//! 3. **Cancellation**: A `CancellationToken` stops an actor at any suspension point

pub mod messages;
pub mod stats_aggregator;
pub mod status_monitor;
