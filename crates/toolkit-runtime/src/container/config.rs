//! # Toolkit Configuration
//!
//! Loaded in three steps, each overriding the last:
//!
//! 1. built-in defaults
//! 2. a TOML file (every section and field optional)
//! 3. environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GT_RPC_URL` | `network.rpc_url` |
//! | `GT_CHAIN_ID` | `network.chain_id` |
//! | `GT_LOG_LEVEL` | `logging.level` |
//! | `GT_PRIVATE_KEY` | `signer.private_key` |
//!
//! The private key is never serialized back out and never printed.

use gt_02_interface_codec::ContractRegistry;
use gt_03_contract_invoker::InvokerConfig;
use gt_04_tx_confirmation::ConfirmationOptions;
use gt_06_batch_payout::BatchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

/// Complete toolkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Extra interface descriptions (`*.json`), added to the bundled ones.
    pub interface_dir: Option<PathBuf>,
    /// Node connection.
    pub network: NetworkConfig,
    /// Logical contract name -> deployed address.
    pub contracts: ContractRegistry,
    /// Gas sizing and pricing.
    pub submission: InvokerConfig,
    /// Receipt polling.
    pub confirmation: ConfirmationOptions,
    /// Batch payouts.
    pub batch: BatchConfig,
    /// Log output.
    pub logging: LoggingConfig,
    /// Signing key.
    #[serde(skip_serializing)]
    pub signer: SignerConfig,
}

/// Node connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
    /// Chain id; asked from the node when unset.
    pub chain_id: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            request_timeout_ms: 30_000,
            chain_id: None,
        }
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `gt_03_contract_invoker=debug,info`.
    pub level: String,
    /// One JSON object per line instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Signing key. Wiped on drop.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignerConfig {
    /// Hex-encoded secp256k1 private key.
    #[serde(default)]
    pub private_key: Option<String>,
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.private_key.as_ref().map(|_| "<redacted>");
        f.debug_struct("SignerConfig").field("private_key", &key).finish()
    }
}

impl Drop for SignerConfig {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// A field holds a value the toolkit cannot work with.
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A command needs a signing key and none was configured.
    #[error("no signing key: set GT_PRIVATE_KEY or signer.private_key")]
    MissingCredential,

    /// The configured signing key is malformed.
    #[error("invalid signing key: {0}")]
    InvalidCredential(String),
}

impl ToolkitConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text, path)
    }

    /// Defaults, then `path` if given, then the process environment, then
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GT_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GT_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Some(value) = lookup("GT_CHAIN_ID") {
            let chain_id = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "GT_CHAIN_ID",
                value: value.clone(),
            })?;
            self.network.chain_id = Some(chain_id);
        }
        if let Some(level) = lookup("GT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(key) = lookup("GT_PRIVATE_KEY") {
            self.signer.private_key = Some(key);
        }
        Ok(())
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        let url = &self.network.rpc_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("network.rpc_url", "must be an http:// or https:// URL"));
        }
        if self.network.request_timeout_ms == 0 {
            return Err(invalid("network.request_timeout_ms", "must be positive"));
        }
        if self.network.chain_id == Some(0) {
            return Err(invalid("network.chain_id", "must be positive"));
        }
        if self.submission.gas_limit == Some(0) {
            return Err(invalid("submission.gas_limit", "must be positive"));
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(invalid("confirmation.poll_interval_ms", "must be positive"));
        }
        if self.confirmation.max_wait_ms < self.confirmation.poll_interval_ms {
            return Err(invalid(
                "confirmation.max_wait_ms",
                "must be at least one poll interval",
            ));
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| ConfigError::Invalid {
            field: "logging.level",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Invoker settings with the network's chain id folded in.
    pub fn invoker_config(&self) -> InvokerConfig {
        let mut submission = self.submission.clone();
        if self.network.chain_id.is_some() {
            submission.chain_id = self.network.chain_id;
        }
        submission
    }
}
