//! Persistence of captured change logs.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use sandstock_changelog_types::{ChangeLog, NewChangeLog, Operation};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::{debug, instrument};

const TABLE: &str = "change_log";

/// Append-only access to the `change_log` table.
#[derive(Debug, Clone)]
pub struct ChangeLogRepository {
    pool: SqlitePool,
}

impl ChangeLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert records on an existing connection or transaction, in order.
    ///
    /// Returns the assigned ids.
    pub async fn insert_batch(
        conn: &mut SqliteConnection,
        records: &[NewChangeLog],
    ) -> StoreResult<Vec<i64>> {
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let result = sqlx::query(
                "INSERT INTO change_log (table_name, operation, old_data, new_data, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.table_name)
            .bind(record.operation.to_string())
            .bind(&record.old_data)
            .bind(&record.new_data)
            .bind(record.created_at)
            .execute(&mut *conn)
            .await?;

            ids.push(result.last_insert_rowid());
        }

        Ok(ids)
    }

    /// Insert records in one dedicated transaction.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn insert_all(&self, records: &[NewChangeLog]) -> StoreResult<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let ids = Self::insert_batch(&mut tx, records).await?;
        tx.commit().await?;

        debug!("Change logs committed");
        Ok(ids)
    }

    /// Most recent change logs, newest first.
    pub async fn list_recent(&self, limit: i64) -> StoreResult<Vec<ChangeLog>> {
        let rows = sqlx::query(
            "SELECT id, table_name, operation, old_data, new_data, created_at
             FROM change_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    /// Most recent change logs of one table, newest first.
    pub async fn list_for_table(&self, table: &str, limit: i64) -> StoreResult<Vec<ChangeLog>> {
        let rows = sqlx::query(
            "SELECT id, table_name, operation, old_data, new_data, created_at
             FROM change_log WHERE table_name = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(table)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM change_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn map_row(row: &SqliteRow) -> StoreResult<ChangeLog> {
    let operation: String = row.try_get("operation")?;
    let operation = Operation::from_str(&operation).map_err(|_| StoreError::InvalidRow {
        table: TABLE,
        message: format!("unknown operation '{operation}'"),
    })?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(ChangeLog {
        id: row.try_get("id")?,
        table_name: row.try_get("table_name")?,
        operation,
        old_data: row.try_get("old_data")?,
        new_data: row.try_get("new_data")?,
        created_at,
    })
}
