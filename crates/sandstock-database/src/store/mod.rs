//! Entity store: typed CRUD inside a unit of work, with lifecycle hooks.

mod entity;
mod hooks;
mod unit_of_work;

pub use entity::{Entity, Tracked};
pub use hooks::ListenerRegistry;
pub use unit_of_work::{EntityStore, UnitOfWork};
