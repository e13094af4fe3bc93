//! Subcommand implementations.
//!
//! Each command returns a report that renders itself for the terminal.

mod changes;
mod migrate;
mod restock;
mod seed;

pub use changes::{ChangesCommand, ChangesReport};
pub use migrate::{MigrateCommand, MigrateReport};
pub use restock::{RestockCommand, RestockReport};
pub use seed::{Scale, SeedCommand, SeedCounts, SeedReport};
