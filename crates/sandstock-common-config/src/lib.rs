//! Configuration types for Sandstock.
//!
//! Settings come from `sandstock.yaml` (or the file named by
//! `SANDSTOCK_CONFIG_PATH`), with `${VAR}` expansion and a few
//! environment overrides.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
