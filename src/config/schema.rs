//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted for the key file passphrase by default.
pub const DEFAULT_PASSPHRASE_ENV: &str = "AUTHORIZER_PASSPHRASE";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// Where key files live and how to unlock them.
    pub keystore: KeystoreConfig,

    /// Chain id and gas defaults applied to loaded credentials.
    pub chain: ChainConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Key file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Directory new key files are written to.
    pub dir: PathBuf,

    /// Key file to load the account from.
    pub key_file: Option<PathBuf>,

    /// Environment variable holding the passphrase.
    pub passphrase_env: String,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("keystore"),
            key_file: None,
            passphrase_env: DEFAULT_PASSPHRASE_ENV.to_string(),
        }
    }
}

/// Chain parameters for signing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Gas limit for every transaction. Unset means estimate per transfer.
    pub gas_limit: Option<u64>,

    /// EIP-1559 fee cap in gwei.
    pub max_fee_per_gas_gwei: Option<u64>,

    /// EIP-1559 priority fee in gwei.
    pub max_priority_fee_gwei: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            gas_limit: None,
            max_fee_per_gas_gwei: None,
            max_priority_fee_gwei: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG` when set.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
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
