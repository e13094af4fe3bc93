use crate::error::{StoreError, StoreResult};
use crate::store::Entity;
use sandstock_changelog_types::{
    CaptureError, ChangeLogStaging, MutationEvent, MutationListener, Operation,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Listeners subscribed to entity lifecycle notifications, per table.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: HashMap<&'static str, Vec<Arc<dyn MutationListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to insert, update and delete on `table`.
    ///
    /// A listener name may be registered once per table.
    pub fn subscribe(
        &mut self,
        table: &'static str,
        listener: Arc<dyn MutationListener>,
    ) -> StoreResult<()> {
        let slot = self.listeners.entry(table).or_default();
        if slot.iter().any(|l| l.name() == listener.name()) {
            return Err(StoreError::DuplicateSubscription {
                table,
                listener: listener.name(),
            });
        }

        debug!(table, listener = listener.name(), "Listener subscribed");
        slot.push(listener);
        Ok(())
    }

    pub fn subscribe_entity<E: Entity>(&mut self, listener: Arc<dyn MutationListener>) -> StoreResult<()> {
        self.subscribe(E::TABLE, listener)
    }

    pub fn is_subscribed(&self, table: &str, listener: &str) -> bool {
        self.listeners
            .get(table)
            .is_some_and(|ls| ls.iter().any(|l| l.name() == listener))
    }

    /// Tables with at least one listener.
    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.listeners
            .iter()
            .filter(|(_, ls)| !ls.is_empty())
            .map(|(t, _)| *t)
    }

    /// Fire the hook for `operation` on every listener of the event's table.
    ///
    /// Stops at the first failing listener.
    pub(crate) fn notify(
        &self,
        operation: Operation,
        event: &MutationEvent<'_>,
        staging: &mut dyn ChangeLogStaging,
    ) -> Result<(), CaptureError> {
        let Some(listeners) = self.listeners.get(event.table) else {
            return Ok(());
        };

        for listener in listeners {
            match operation {
                Operation::Insert => listener.after_insert(event, staging)?,
                Operation::Update => listener.after_update(event, staging)?,
                Operation::Delete => listener.after_delete(event, staging)?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (table, listeners) in &self.listeners {
            let names: Vec<_> = listeners.iter().map(|l| l.name()).collect();
            map.entry(table, &names);
        }
        map.finish()
    }
}
