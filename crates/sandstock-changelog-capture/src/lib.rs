//! Change data capture for Sandstock.
//!
//! Subscribes to entity store lifecycle hooks and turns every insert,
//! update and delete into a `change_log` row, either:
//!
//! - immediately, staged into the unit of work that made the change, or
//! - queued in a [`ChangeLogQueue`] and written later by [`ChangeLogQueue::flush`]
//!   (typically driven by [`flush_loop`]).

mod diff;
mod flush;
mod queue;
mod recorder;

pub use diff::{compute_diff, Diff};
pub use flush::{flush_loop, FlushConfig, FlushStats};
pub use queue::ChangeLogQueue;
pub use recorder::{CaptureMode, ChangeRecorder, RECORDER_NAME};

pub use sandstock_changelog_types::{ChangeLog, NewChangeLog, Operation};
