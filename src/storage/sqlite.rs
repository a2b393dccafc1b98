//! SQLite stats source
//!
//! Reads the stats database the messenger server writes to.
//!
//! ## Features
//!
//! - **Read-only**: The database is opened read-only; this crate never writes it
//! - **Connection pooling**: One pooled connection is checked out per read and
//!   returned when the read's scope ends, whether it succeeded or not
//! - **Lenient directory**: Client entries whose JSON cannot be decoded are
//!   skipped (they render as unknown clients) instead of failing the read

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::backend::StatsSource;
use super::error::{StorageError, StorageResult};
use super::schema::{ClientInfo, CurrentCounter, HourlyStatsRow};

/// SQLite stats source
pub struct SqliteStatsSource {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteStatsSource {
    /// Open an existing stats database read-only
    ///
    /// ## Example
    ///
    /// ```no_run
    /// # use messenger_status::storage::sqlite::SqliteStatsSource;
    /// # async fn example() -> anyhow::Result<()> {
    /// let source = SqliteStatsSource::open("../server/stats.sqlite").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn open(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("opening stats database at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(30)); // the server may be mid-write

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Ok(Self::from_pool(pool, db_path_str))
    }

    /// Wrap an already configured pool
    pub fn from_pool(pool: Pool<Sqlite>, db_path: impl Into<String>) -> Self {
        Self {
            pool,
            db_path: db_path.into(),
        }
    }
}

#[async_trait]
impl StatsSource for SqliteStatsSource {
    #[instrument(skip(self))]
    async fn current_counter(&self, key: &str) -> StorageResult<Option<CurrentCounter>> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query("SELECT date_updated, value FROM t_stats_current WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            debug!("no current value stored for {key}");
            return Ok(None);
        };

        let updated_at: NaiveDateTime = row.try_get("date_updated")?;
        let raw: String = row.try_get("value")?;
        let value = serde_json::from_str::<serde_json::Value>(&raw)?
            .as_i64()
            .ok_or_else(|| {
                StorageError::SerializationError(format!("{key} is not an integer: {raw}"))
            })?;

        Ok(Some(CurrentCounter {
            value,
            updated_at: updated_at.and_utc(),
        }))
    }

    #[instrument(skip(self))]
    async fn clients(&self) -> StorageResult<HashMap<i64, ClientInfo>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query("SELECT id, data FROM t_client")
            .fetch_all(&mut *conn)
            .await?;

        let mut clients = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let data: String = row.try_get("data")?;
            match serde_json::from_str::<ClientInfo>(&data) {
                Ok(client) => {
                    clients.insert(id, client);
                }
                Err(e) => warn!("skipping client {id} with undecodable data: {e}"),
            }
        }

        debug!("loaded {} client directory entries", clients.len());
        Ok(clients)
    }

    #[instrument(skip(self))]
    async fn hourly_stats_since(&self, threshold_hour: i64) -> StorageResult<Vec<HourlyStatsRow>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            r#"
            SELECT hour, client_id, users_active, messages_sent, messages_received
            FROM t_stats_hour_client
            WHERE hour >= ?
            "#,
        )
        .bind(threshold_hour)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter()
            .map(|row| -> StorageResult<HourlyStatsRow> {
                Ok(HourlyStatsRow {
                    hour: row.try_get("hour")?,
                    client_id: row.try_get("client_id")?,
                    users_active: row.try_get("users_active")?,
                    messages_sent: row.try_get("messages_sent")?,
                    messages_received: row.try_get("messages_received")?,
                })
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!("SQLite stats database at {}", self.db_path)
    }
}
