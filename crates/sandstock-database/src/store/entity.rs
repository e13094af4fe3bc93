use sandstock_changelog_types::{ChangeHistory, EntitySnapshot, FieldValue};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::FromRow;
use std::ops::{Deref, DerefMut};

/// A business entity persisted in its own table.
///
/// The table must have an `INTEGER PRIMARY KEY` column named `id`, and
/// every other column must appear in [`Entity::fields`].
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const TABLE: &'static str;

    /// Storage-assigned id; `None` until inserted.
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Every persisted column, `id` included, in declaration order.
    fn fields(&self) -> EntitySnapshot;
}

/// An entity loaded from or written to the store, together with the
/// column values it had at that moment.
#[derive(Debug, Clone)]
pub struct Tracked<E> {
    entity: E,
    persisted: EntitySnapshot,
}

impl<E: Entity> Tracked<E> {
    pub(crate) fn new(entity: E) -> Self {
        let persisted = entity.fields();
        Self { entity, persisted }
    }

    /// Values as last written to or read from the store.
    pub fn persisted(&self) -> &EntitySnapshot {
        &self.persisted
    }

    /// Changes made in memory since the entity was last persisted.
    pub fn history(&self) -> ChangeHistory {
        ChangeHistory::between(&self.persisted, &self.entity.fields())
    }

    pub fn is_dirty(&self) -> bool {
        self.history().has_changes()
    }

    pub(crate) fn mark_persisted(&mut self, snapshot: EntitySnapshot) {
        self.persisted = snapshot;
    }

    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E> Deref for Tracked<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E> DerefMut for Tracked<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

pub(crate) fn bind_value<'q>(query: SqliteQuery<'q>, value: &FieldValue) -> SqliteQuery<'q> {
    match value {
        FieldValue::Null => query.bind(Option::<i64>::None),
        FieldValue::Bool(b) => query.bind(*b),
        FieldValue::Integer(i) => query.bind(*i),
        FieldValue::Float(f) => query.bind(*f),
        FieldValue::Text(s) => query.bind(s.clone()),
        FieldValue::Timestamp(t) => query.bind(*t),
    }
}
