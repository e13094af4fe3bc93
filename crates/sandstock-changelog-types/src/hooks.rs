//! Mutation hook contract between the entity store and its subscribers.

use crate::{CaptureError, ChangeHistory, EntitySnapshot, NewChangeLog};

/// Notification for one completed low-level mutation.
///
/// Fired after the statement has run inside the open transaction and
/// before that transaction commits.
#[derive(Debug, Clone, Copy)]
pub struct MutationEvent<'a> {
    /// Table of the mutated entity.
    pub table: &'static str,
    /// Every persisted column of the entity in its current in-memory state.
    pub snapshot: &'a EntitySnapshot,
    /// Per-attribute history; present for updates only.
    pub history: Option<&'a ChangeHistory>,
}

impl<'a> MutationEvent<'a> {
    pub fn new(table: &'static str, snapshot: &'a EntitySnapshot) -> Self {
        Self {
            table,
            snapshot,
            history: None,
        }
    }

    pub fn with_history(mut self, history: &'a ChangeHistory) -> Self {
        self.history = Some(history);
        self
    }
}

/// Write-side of the unit of work that fired a mutation event.
///
/// Records staged here are written in the same transaction as the mutation.
pub trait ChangeLogStaging {
    fn stage(&mut self, record: NewChangeLog);
}

impl ChangeLogStaging for Vec<NewChangeLog> {
    fn stage(&mut self, record: NewChangeLog) {
        self.push(record);
    }
}

/// Subscriber to entity lifecycle notifications.
///
/// An error returned from any hook aborts the unit of work that fired it.
pub trait MutationListener: Send + Sync {
    /// Stable name used to detect duplicate subscriptions.
    fn name(&self) -> &'static str;

    fn after_insert(
        &self,
        event: &MutationEvent<'_>,
        staging: &mut dyn ChangeLogStaging,
    ) -> Result<(), CaptureError>;

    fn after_update(
        &self,
        event: &MutationEvent<'_>,
        staging: &mut dyn ChangeLogStaging,
    ) -> Result<(), CaptureError>;

    fn after_delete(
        &self,
        event: &MutationEvent<'_>,
        staging: &mut dyn ChangeLogStaging,
    ) -> Result<(), CaptureError>;
}
