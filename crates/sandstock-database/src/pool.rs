use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to open database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub path: String,
    pub max_connections: u32,
    /// Journal in WAL mode so the queued-flush writer and readers do not
    /// wait on open business transactions
    pub wal_mode: bool,
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
}

impl PoolConfig {
    /// File-backed database with WAL enabled.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            wal_mode: true,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Single-connection in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens a fresh database, so the
    /// pool holds exactly one connection and never recycles it.
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY.to_string(),
            max_connections: 1,
            wal_mode: false,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_connections == 0 {
            return Err(PoolError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if self.is_in_memory() && self.max_connections > 1 {
            return Err(PoolError::InvalidConfig(
                "in-memory databases require max_connections = 1".to_string(),
            ));
        }

        Ok(())
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, PoolError> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            let journal = if self.wal_mode {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            };
            // WAL stays consistent at NORMAL; rollback journals need FULL.
            let synchronous = if self.wal_mode {
                SqliteSynchronous::Normal
            } else {
                SqliteSynchronous::Full
            };
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(journal)
                .synchronous(synchronous)
        };

        Ok(options.busy_timeout(self.busy_timeout).foreign_keys(true))
    }
}

/// Database connection pool wrapper
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    #[instrument(skip(config), fields(path = %config.path))]
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let mut options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect_with(config.connect_options()?).await?;

        info!(
            max_connections = config.max_connections,
            wal = config.wal_mode,
            "Database pool opened"
        );

        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool gracefully
    #[instrument(skip(self))]
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn count(pool: &SqlitePool) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stock")
            .fetch_one(pool)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn test_in_memory_data_outlives_each_query() {
        let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();

        sqlx::query("CREATE TABLE stock (id INTEGER PRIMARY KEY, qty INTEGER NOT NULL)")
            .execute(pool.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO stock (qty) VALUES (7)")
            .execute(pool.pool())
            .await
            .unwrap();

        assert_eq!(count(pool.pool()).await, 1);
        pool.close().await;
    }

    #[test]
    fn test_config_validation() {
        let result = PoolConfig::in_memory().with_max_connections(4).validate();
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));

        let result = PoolConfig::file("stock.db").with_max_connections(0).validate();
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));

        assert!(PoolConfig::file("stock.db").validate().is_ok());
    }

    #[tokio::test]
    async fn test_file_pool_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        let pool = DatabasePool::new(PoolConfig::file(path.to_string_lossy()))
            .await
            .unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);

        assert!(path.exists());
        pool.close().await;
    }

    #[tokio::test]
    async fn test_rollback_journal_without_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        let config = PoolConfig::file(path.to_string_lossy()).with_wal_mode(false);
        let pool = DatabasePool::new(config).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_wal_reader_sees_committed_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        let pool = DatabasePool::new(PoolConfig::file(path.to_string_lossy()))
            .await
            .unwrap();

        sqlx::query("CREATE TABLE stock (id INTEGER PRIMARY KEY, qty INTEGER NOT NULL)")
            .execute(pool.pool())
            .await
            .unwrap();

        let mut tx = pool.pool().begin().await.unwrap();
        sqlx::query("INSERT INTO stock (qty) VALUES (3)")
            .execute(&mut *tx)
            .await
            .unwrap();

        // Reads on another connection proceed while the write is open.
        assert_eq!(count(pool.pool()).await, 0);

        tx.commit().await.unwrap();
        assert_eq!(count(pool.pool()).await, 1);
        pool.close().await;
    }
}
