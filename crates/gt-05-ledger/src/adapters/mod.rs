//! Filesystem access.

pub mod file;

pub use file::load_ledger;
