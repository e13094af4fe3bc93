use super::entity::bind_value;
use super::{Entity, ListenerRegistry, Tracked};
use crate::changelog::ChangeLogRepository;
use crate::error::{StoreError, StoreResult};
use sandstock_changelog_types::{ChangeHistory, EntitySnapshot, MutationEvent, NewChangeLog, Operation};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Entry point to the entity store.
///
/// Cheap to clone; every clone shares the pool and the listener registry.
#[derive(Debug, Clone)]
pub struct EntityStore {
    pool: SqlitePool,
    registry: Arc<ListenerRegistry>,
}

impl EntityStore {
    pub fn new(pool: SqlitePool, registry: ListenerRegistry) -> Self {
        Self {
            pool,
            registry: Arc::new(registry),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Open a unit of work backed by a new transaction.
    pub async fn begin(&self) -> StoreResult<UnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork {
            tx,
            registry: Arc::clone(&self.registry),
            staged: Vec::new(),
            aborted: false,
        })
    }
}

/// A single database transaction plus the change logs staged into it.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls the
/// transaction back, staged change logs included.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    registry: Arc<ListenerRegistry>,
    staged: Vec<NewChangeLog>,
    aborted: bool,
}

impl UnitOfWork {
    /// Insert a new entity and fire `after_insert`.
    #[instrument(skip(self, entity), fields(table = E::TABLE))]
    pub async fn insert<E: Entity>(&mut self, mut entity: E) -> StoreResult<Tracked<E>> {
        self.ensure_open()?;

        let snapshot = entity.fields();
        let columns: Vec<_> = snapshot
            .iter()
            .filter(|(name, value)| *name != "id" || !value.is_null())
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            columns.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in &columns {
            query = bind_value(query, value);
        }
        let result = query.execute(&mut *self.tx).await?;

        entity.set_id(result.last_insert_rowid());
        let tracked = Tracked::new(entity);
        debug!(id = tracked.id(), "Inserted");

        let snapshot = tracked.fields();
        self.fire(Operation::Insert, MutationEvent::new(E::TABLE, &snapshot))?;

        Ok(tracked)
    }

    /// Load an entity by id.
    pub async fn get<E: Entity>(&mut self, id: i64) -> StoreResult<Tracked<E>> {
        self.find(id)
            .await?
            .ok_or(StoreError::NotFound { table: E::TABLE, id })
    }

    pub async fn find<E: Entity>(&mut self, id: i64) -> StoreResult<Option<Tracked<E>>> {
        self.ensure_open()?;

        let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);
        let entity = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(entity.map(Tracked::new))
    }

    /// Load entities ordered by id.
    pub async fn list<E: Entity>(&mut self, limit: i64) -> StoreResult<Vec<Tracked<E>>> {
        self.ensure_open()?;

        let sql = format!("SELECT * FROM {} ORDER BY id LIMIT ?", E::TABLE);
        let entities = sqlx::query_as::<_, E>(&sql)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(entities.into_iter().map(Tracked::new).collect())
    }

    /// Flush in-memory changes of a tracked entity and fire `after_update`.
    ///
    /// Only changed columns are written, but the hook fires for every call,
    /// including when nothing changed.
    #[instrument(skip(self, tracked), fields(table = E::TABLE, id = tracked.id()))]
    pub async fn update<E: Entity>(&mut self, tracked: &mut Tracked<E>) -> StoreResult<()> {
        self.ensure_open()?;
        let id = tracked.id().ok_or(StoreError::NotPersisted { table: E::TABLE })?;

        let current = tracked.fields();
        let history = ChangeHistory::between(tracked.persisted(), &current);
        let changed: Vec<_> = history.changed_fields().filter(|name| *name != "id").collect();

        if changed.is_empty() {
            debug!("No column changes");
        } else {
            let assignments = changed
                .iter()
                .map(|name| format!("{name} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("UPDATE {} SET {} WHERE id = ?", E::TABLE, assignments);

            let mut query = sqlx::query(&sql);
            for name in &changed {
                if let Some(value) = current.get(name) {
                    query = bind_value(query, value);
                }
            }
            let result = query.bind(id).execute(&mut *self.tx).await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound { table: E::TABLE, id });
            }
            debug!(columns = changed.len(), "Updated");
        }

        self.fire(
            Operation::Update,
            MutationEvent::new(E::TABLE, &current).with_history(&history),
        )?;
        tracked.mark_persisted(current);

        Ok(())
    }

    /// Delete a tracked entity and fire `after_delete` with its last values.
    #[instrument(skip(self, tracked), fields(table = E::TABLE, id = tracked.id()))]
    pub async fn delete<E: Entity>(&mut self, tracked: Tracked<E>) -> StoreResult<E> {
        self.ensure_open()?;
        let id = tracked.id().ok_or(StoreError::NotPersisted { table: E::TABLE })?;

        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { table: E::TABLE, id });
        }
        debug!("Deleted");

        let snapshot: EntitySnapshot = tracked.fields();
        self.fire(Operation::Delete, MutationEvent::new(E::TABLE, &snapshot))?;

        Ok(tracked.into_inner())
    }

    /// Change logs staged so far by synchronous listeners.
    pub fn staged(&self) -> &[NewChangeLog] {
        &self.staged
    }

    /// Write staged change logs and commit, all in one transaction.
    ///
    /// Returns the number of change logs written.
    #[instrument(skip(self), fields(staged = self.staged.len()))]
    pub async fn commit(mut self) -> StoreResult<usize> {
        self.ensure_open()?;

        let written = ChangeLogRepository::insert_batch(&mut self.tx, &self.staged).await?.len();
        self.tx.commit().await?;

        debug!(written, "Unit of work committed");
        Ok(written)
    }

    /// Discard every mutation and staged change log.
    pub async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.aborted {
            return Err(StoreError::Aborted);
        }
        Ok(())
    }

    fn fire(&mut self, operation: Operation, event: MutationEvent<'_>) -> StoreResult<()> {
        if let Err(err) = self.registry.notify(operation, &event, &mut self.staged) {
            warn!(table = event.table, %operation, error = %err, "Mutation hook failed, aborting unit of work");
            self.aborted = true;
            return Err(err.into());
        }
        Ok(())
    }
}
