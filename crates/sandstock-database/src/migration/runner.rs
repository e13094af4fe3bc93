use super::types::*;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::{debug, info};

const TRACKING_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS _sandstock_migrations (
        version INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        checksum TEXT NOT NULL,
        applied_at TEXT NOT NULL,
        execution_time_ms INTEGER NOT NULL
    )
"#;

pub struct MigrationRunner {
    pool: SqlitePool,
    migrations: BTreeMap<i64, Migration>,
}

impl MigrationRunner {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            migrations: BTreeMap::new(),
        }
    }

    /// Runner preloaded with the Sandstock schema.
    pub fn with_schema(pool: SqlitePool) -> Self {
        let mut runner = Self::new(pool);
        runner.add_migrations(super::schema::migrations());
        runner
    }

    pub fn add_migration(&mut self, migration: Migration) {
        self.migrations.insert(migration.version, migration);
    }

    pub fn add_migrations(&mut self, migrations: Vec<Migration>) {
        for migration in migrations {
            self.add_migration(migration);
        }
    }

    /// Initialize the migration tracking table
    pub async fn init(&self) -> Result<(), MigrationError> {
        sqlx::query(TRACKING_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Highest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, MigrationError> {
        self.init().await?;

        let row = sqlx::query("SELECT MAX(version) AS version FROM _sandstock_migrations")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<Option<i64>, _>("version")?)
    }

    pub async fn get_applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        self.init().await?;

        let applied = sqlx::query_as::<_, AppliedMigration>(
            "SELECT version, name, checksum, applied_at, execution_time_ms
             FROM _sandstock_migrations
             ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(applied)
    }

    pub async fn pending(&self) -> Result<Vec<Migration>, MigrationError> {
        let current = self.current_version().await?.unwrap_or(0);

        Ok(self
            .migrations
            .range(current + 1..)
            .map(|(_, m)| m.clone())
            .collect())
    }

    /// Apply every pending migration, each in its own transaction.
    pub async fn run(&self) -> Result<Vec<MigrationResult>, MigrationError> {
        let pending = self.pending().await?;
        if pending.is_empty() {
            debug!("Schema is up to date");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(pending.len());
        for migration in pending {
            results.push(self.apply(migration).await?);
        }

        Ok(results)
    }

    /// Compare applied checksums against the embedded migrations.
    pub async fn verify(&self) -> Result<Vec<String>, MigrationError> {
        let applied = self.get_applied().await?;
        let mut mismatches = Vec::new();

        for applied_migration in applied {
            match self.migrations.get(&applied_migration.version) {
                Some(known) if known.checksum != applied_migration.checksum => {
                    mismatches.push(format!(
                        "Migration {} checksum mismatch: expected {}, found {}",
                        applied_migration.version, known.checksum, applied_migration.checksum
                    ));
                }
                Some(_) => {}
                None => mismatches.push(format!(
                    "Migration {} is applied but unknown to this build",
                    applied_migration.version
                )),
            }
        }

        Ok(mismatches)
    }

    async fn apply(&self, migration: Migration) -> Result<MigrationResult, MigrationError> {
        let start = std::time::Instant::now();
        info!("Applying migration: {} - {}", migration.version, migration.name);

        let mut tx = self.pool.begin().await?;

        sqlx::query(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|source| MigrationError::ExecutionFailed {
                version: migration.version,
                name: migration.name.clone(),
                source,
            })?;

        let execution_time_ms = start.elapsed().as_millis() as i64;

        sqlx::query(
            "INSERT INTO _sandstock_migrations
             (version, name, checksum, applied_at, execution_time_ms)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(migration.version)
        .bind(&migration.name)
        .bind(&migration.checksum)
        .bind(Utc::now())
        .bind(execution_time_ms)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(MigrationResult {
            version: migration.version,
            name: migration.name,
            execution_time_ms,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub version: i64,
    pub name: String,
    pub execution_time_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{DatabasePool, PoolConfig};

    async fn setup_pool() -> SqlitePool {
        let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();
        pool.pool().clone()
    }

    #[tokio::test]
    async fn test_migration_runner_init() {
        let runner = MigrationRunner::new(setup_pool().await);

        runner.init().await.unwrap();
        assert_eq!(runner.current_version().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_migration_execution() {
        let mut runner = MigrationRunner::new(setup_pool().await);
        runner.add_migration(Migration::new(
            1,
            "test_migration",
            "CREATE TABLE test_table (id INTEGER PRIMARY KEY)",
        ));

        let results = runner.run().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].version, 1);
        assert_eq!(runner.current_version().await.unwrap(), Some(1));

        // Second run is a no-op
        assert!(runner.run().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_migration_is_not_recorded() {
        let mut runner = MigrationRunner::new(setup_pool().await);
        runner.add_migration(Migration::new(1, "ok", "CREATE TABLE a (id INTEGER)"));
        runner.add_migration(Migration::new(2, "broken", "CREATE TABLE"));

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, MigrationError::ExecutionFailed { version: 2, .. }));
        assert_eq!(runner.current_version().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_schema_applies_and_verifies() {
        let runner = MigrationRunner::with_schema(setup_pool().await);

        let results = runner.run().await.unwrap();
        assert_eq!(results.len(), crate::schema::migrations().len());
        assert!(runner.verify().await.unwrap().is_empty());
        assert!(runner.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_reports_checksum_mismatch() {
        let pool = setup_pool().await;
        let mut runner = MigrationRunner::new(pool.clone());
        runner.add_migration(Migration::new(1, "a", "CREATE TABLE a (id INTEGER)"));
        runner.run().await.unwrap();

        let mut edited = MigrationRunner::new(pool);
        edited.add_migration(Migration::new(1, "a", "CREATE TABLE a (id INTEGER, x TEXT)"));
        let mismatches = edited.verify().await.unwrap();
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].contains("checksum mismatch"));
    }
}
