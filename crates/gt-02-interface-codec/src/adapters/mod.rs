//! # Adapters Layer (Outer Hexagon)
//!
//! Loading interface descriptions from JSON documents and the bundled
//! catalog.

pub mod catalog;
pub mod json;

pub use catalog::*;
pub use json::parse_interface;
