//! Persistence layer for Sandstock.
//!
//! - SQLite connection pool and schema migrations
//! - Business entity models (`dim_*` / `fact_*` tables)
//! - The entity store: a unit of work that fires `after_insert`,
//!   `after_update` and `after_delete` hooks to registered listeners
//! - The `change_log` repository

pub mod changelog;
pub mod error;
pub mod migration;
pub mod models;
pub mod pool;
pub mod store;

pub use changelog::ChangeLogRepository;
pub use error::{StoreError, StoreResult};
pub use migration::{schema, MigrationError, MigrationRunner};
pub use pool::{DatabasePool, PoolConfig, PoolError};
pub use store::{Entity, EntityStore, ListenerRegistry, Tracked, UnitOfWork};
