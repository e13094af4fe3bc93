//! Change log types for Sandstock.
//!
//! Shared vocabulary between the entity store (which fires mutation hooks)
//! and the change capture recorder (which turns them into audit rows).

mod error;
mod hooks;
mod operation;
mod payload;
mod record;
mod snapshot;
mod value;

pub use error::CaptureError;
pub use hooks::{ChangeLogStaging, MutationEvent, MutationListener};
pub use operation::Operation;
pub use payload::{decode_payload, encode_payload, FieldMap};
pub use record::{ChangeLog, NewChangeLog};
pub use snapshot::{AttributeHistory, ChangeHistory, EntitySnapshot};
pub use value::FieldValue;
