//! Wiring of the store, the change recorder and the flush task.

use std::time::Duration;

use anyhow::Context;
use sandstock_changelog_capture::{
    flush_loop, CaptureMode, ChangeLogQueue, ChangeRecorder, FlushConfig, FlushStats,
};
use sandstock_common_config::{ChangelogMode, DatabaseConfig, SandstockConfig};
use sandstock_database::migration::MigrationResult;
use sandstock_database::pool::IN_MEMORY;
use sandstock_database::{
    ChangeLogRepository, DatabasePool, EntityStore, ListenerRegistry, MigrationRunner, PoolConfig,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Translate the file settings into a pool configuration.
pub fn pool_config(database: &DatabaseConfig) -> PoolConfig {
    let busy_timeout = Duration::from_millis(database.busy_timeout_ms);
    if database.path == IN_MEMORY {
        return PoolConfig::in_memory().with_busy_timeout(busy_timeout);
    }

    PoolConfig::file(database.path.as_str())
        .with_max_connections(database.max_connections)
        .with_wal_mode(database.wal_mode)
        .with_busy_timeout(busy_timeout)
}

struct Flusher {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<FlushStats>,
}

/// An open database with change capture attached to every business entity.
pub struct App {
    pool: DatabasePool,
    migrations: Vec<MigrationResult>,
    store: EntityStore,
    changelog: ChangeLogRepository,
    queue: Option<ChangeLogQueue>,
    flusher: Option<Flusher>,
}

impl App {
    /// Open the database, bring the schema up to date and subscribe the
    /// change recorder.
    ///
    /// In queued mode a background task flushes the queue until
    /// [`App::shutdown`] is called.
    pub async fn open(config: &SandstockConfig) -> anyhow::Result<Self> {
        let pool = DatabasePool::new(pool_config(&config.database))
            .await
            .with_context(|| format!("failed to open database {}", config.database.path))?;

        let migrations = MigrationRunner::with_schema(pool.pool().clone()).run().await?;
        if !migrations.is_empty() {
            info!(count = migrations.len(), "Applied pending migrations");
        }

        let changelog = ChangeLogRepository::new(pool.pool().clone());
        let queue = match config.changelog.mode {
            ChangelogMode::Immediate => None,
            ChangelogMode::Queued => Some(ChangeLogQueue::new()),
        };
        let mode = match &queue {
            Some(queue) => CaptureMode::Queued(queue.clone()),
            None => CaptureMode::Immediate,
        };

        let recorder = ChangeRecorder::new(mode);
        let mut registry = ListenerRegistry::new();
        recorder.subscribe_models(&mut registry)?;
        let store = EntityStore::new(pool.pool().clone(), registry);

        let flusher = queue.as_ref().map(|queue| {
            let flush_config = FlushConfig {
                interval: Duration::from_millis(config.changelog.flush_interval_ms),
                threshold: config.changelog.flush_threshold,
            };
            let (shutdown, rx) = watch::channel(false);
            let handle = tokio::spawn(flush_loop(queue.clone(), changelog.clone(), flush_config, rx));
            Flusher { shutdown, handle }
        });

        info!(mode = %config.changelog.mode, "Change capture enabled");

        Ok(Self {
            pool,
            migrations,
            store,
            changelog,
            queue,
            flusher,
        })
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Migrations applied while opening.
    pub fn migrations(&self) -> &[MigrationResult] {
        &self.migrations
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn changelog(&self) -> &ChangeLogRepository {
        &self.changelog
    }

    /// Queue of pending change logs; `None` in immediate mode.
    pub fn queue(&self) -> Option<&ChangeLogQueue> {
        self.queue.as_ref()
    }

    /// Stop the flush task after a final flush and close the pool.
    ///
    /// Fails if change logs remain queued once the task has stopped.
    pub async fn shutdown(self) -> anyhow::Result<Option<FlushStats>> {
        let stats = match self.flusher {
            Some(flusher) => {
                // The task also stops when the sender is dropped.
                let _ = flusher.shutdown.send(true);
                let stats = flusher.handle.await.context("flush task panicked")?;
                info!(
                    flushes = stats.flushes,
                    records = stats.records,
                    failures = stats.failures,
                    "Flush task stopped"
                );
                Some(stats)
            }
            None => None,
        };

        let unflushed = self.queue.as_ref().map_or(0, ChangeLogQueue::len);
        self.pool.close().await;

        if unflushed > 0 {
            warn!(unflushed, "Change logs left in queue");
            anyhow::bail!("{unflushed} change logs were not persisted");
        }
        Ok(stats)
    }
}
