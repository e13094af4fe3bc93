//! Business entities of the inventory domain.
//!
//! `dim_*` tables hold reference data with soft-delete flags;
//! `fact_order` is the append-mostly order ledger.

mod address;
mod contact;
mod order;
mod partner;
mod product;
mod user;
mod warehouse;

pub use address::Address;
pub use contact::Contact;
pub use order::{Order, OrderCategory};
pub use partner::Partner;
pub use product::Product;
pub use user::User;
pub use warehouse::Warehouse;
