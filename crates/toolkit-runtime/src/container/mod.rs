//! # Toolkit Container
//!
//! Configuration and the wired-up services the commands run against.

pub mod config;
pub mod toolkit;

pub use config::{ConfigError, LoggingConfig, NetworkConfig, SignerConfig, ToolkitConfig};
pub use toolkit::{Toolkit, ToolkitError};
