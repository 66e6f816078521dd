//! # Gov-Toolkit Runtime
//!
//! Wiring for the `gov-toolkit` binary.
//!
//! ## Modules
//!
//! - `container/` - `ToolkitConfig` and the `Toolkit` service container
//! - `logging` - tracing subscriber bootstrap
//! - `commands` - what each subcommand does, minus the printing
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, TOML file, `GT_*` environment)
//! 2. Validate it
//! 3. Install the log subscriber
//! 4. Build the transport and the services on top of it
//! 5. Run one command

pub mod commands;
pub mod container;
pub mod logging;

pub use container::{ConfigError, Toolkit, ToolkitConfig, ToolkitError};
pub use logging::{init_logging, LoggingError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
