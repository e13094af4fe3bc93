//! Mutation listener that turns entity changes into change logs.

use crate::diff::compute_diff;
use crate::queue::ChangeLogQueue;
use sandstock_changelog_types::{
    CaptureError, ChangeLogStaging, MutationEvent, MutationListener, Operation,
};
use sandstock_database::models::{Address, Contact, Order, Partner, Product, User, Warehouse};
use sandstock_database::{Entity, ListenerRegistry, StoreResult};
use std::sync::Arc;
use tracing::{debug, trace};

/// Listener name the recorder registers under.
pub const RECORDER_NAME: &str = "changelog";

/// Where captured change logs go.
#[derive(Debug, Clone)]
pub enum CaptureMode {
    /// Staged into the unit of work and committed with the mutation.
    Immediate,
    /// Pushed onto a queue and committed by a later flush.
    ///
    /// A queued record survives a rollback of the transaction that produced it.
    Queued(ChangeLogQueue),
}

impl CaptureMode {
    pub fn queue(&self) -> Option<&ChangeLogQueue> {
        match self {
            Self::Queued(queue) => Some(queue),
            Self::Immediate => None,
        }
    }
}

/// Change data capture recorder.
///
/// Performs no I/O; in queued mode the only side effect is a queue push.
#[derive(Debug)]
pub struct ChangeRecorder {
    mode: CaptureMode,
}

impl ChangeRecorder {
    pub fn new(mode: CaptureMode) -> Arc<Self> {
        Arc::new(Self { mode })
    }

    pub fn mode(&self) -> &CaptureMode {
        &self.mode
    }

    /// Capture inserts, updates and deletes of `E`.
    pub fn subscribe<E: Entity>(self: &Arc<Self>, registry: &mut ListenerRegistry) -> StoreResult<()> {
        registry.subscribe_entity::<E>(self.clone())
    }

    /// Capture every business entity of the inventory domain.
    pub fn subscribe_models(self: &Arc<Self>, registry: &mut ListenerRegistry) -> StoreResult<()> {
        self.subscribe::<User>(registry)?;
        self.subscribe::<Contact>(registry)?;
        self.subscribe::<Address>(registry)?;
        self.subscribe::<Partner>(registry)?;
        self.subscribe::<Warehouse>(registry)?;
        self.subscribe::<Product>(registry)?;
        self.subscribe::<Order>(registry)?;
        Ok(())
    }

    fn capture(
        &self,
        operation: Operation,
        event: &MutationEvent<'_>,
        staging: &mut dyn ChangeLogStaging,
    ) -> Result<(), CaptureError> {
        let diff = compute_diff(operation, event)?;
        let Some(record) = diff.into_record(event.table, operation)? else {
            trace!(table = event.table, %operation, "Empty diff, nothing captured");
            return Ok(());
        };

        match &self.mode {
            CaptureMode::Immediate => {
                debug!(table = event.table, %operation, "Change log staged");
                staging.stage(record);
            }
            CaptureMode::Queued(queue) => {
                queue.put(record);
                debug!(table = event.table, %operation, depth = queue.len(), "Change log queued");
            }
        }
        Ok(())
    }
}

impl MutationListener for ChangeRecorder {
    fn name(&self) -> &'static str {
        RECORDER_NAME
    }

    fn after_insert(&self, event: &MutationEvent<'_>, staging: &mut dyn ChangeLogStaging) -> Result<(), CaptureError> {
        self.capture(Operation::Insert, event, staging)
    }

    fn after_update(&self, event: &MutationEvent<'_>, staging: &mut dyn ChangeLogStaging) -> Result<(), CaptureError> {
        self.capture(Operation::Update, event, staging)
    }

    fn after_delete(&self, event: &MutationEvent<'_>, staging: &mut dyn ChangeLogStaging) -> Result<(), CaptureError> {
        self.capture(Operation::Delete, event, staging)
    }
}
