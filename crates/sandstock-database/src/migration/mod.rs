//! Embedded schema migrations.

mod runner;
pub mod schema;
mod types;

pub use runner::{MigrationResult, MigrationRunner};
pub use types::{AppliedMigration, Migration, MigrationError};
