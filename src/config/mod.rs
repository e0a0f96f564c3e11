//! Configuration for the bank deployer

pub mod rpc;

use crate::step::Step;
use crate::{Error, Result};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Re-export RPC config
pub use rpc::RpcConfig;

/// Default environment variable holding the hex private key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Fixed transaction parameters applied to every signed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Gas limit in units
    pub gas_limit: u64,
    /// Legacy gas price in wei
    pub gas_price: u128,
    /// Native value attached to each transaction, in wei
    pub value: U256,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_limit: 3_000_000,
            gas_price: 1_000_000,
            value: U256::ZERO,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC URL of the node (see [`RpcConfig`] for resolution order)
    pub rpc_url: Option<String>,
    /// Name of the environment variable holding the private key
    pub key_env: String,
    /// Compiled contract bytecode (hex text or solc/Foundry JSON artifact)
    pub artifact_path: PathBuf,
    /// Transaction parameters
    pub gas: GasConfig,
    /// Steps executed after deployment
    pub sequence: Vec<Step>,
    /// Wait for each transaction's receipt before moving on
    pub wait_for_receipts: bool,
    /// Per-step timeout in seconds (none = wait forever)
    pub request_timeout_secs: Option<u64>,
    /// Append a JSONL record of every step to this file
    pub transcript_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            key_env: PRIVATE_KEY_ENV.to_string(),
            artifact_path: PathBuf::from("contracts/out/Bank.bin"),
            gas: GasConfig::default(),
            sequence: Step::default_sequence(),
            wait_for_receipts: true,
            request_timeout_secs: None,
            transcript_path: None,
        }
    }
}

impl Config {
    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_fixed_transaction_options() {
        let config = Config::default();
        assert_eq!(config.gas.gas_limit, 3_000_000);
        assert_eq!(config.gas.gas_price, 1_000_000);
        assert_eq!(config.gas.value, U256::ZERO);
        assert_eq!(config.key_env, "PRIVATE_KEY");
        assert!(config.wait_for_receipts);
        assert_eq!(config.sequence, Step::default_sequence());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let value = serde_json::json!({
            "rpc_url": "http://127.0.0.1:8545",
            "gas": { "gas_price": 2000000000 },
            "sequence": ["balance", "deposit 5 gwei"]
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");

        assert_eq!(parsed.rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(parsed.gas.gas_price, 2_000_000_000);
        assert_eq!(parsed.gas.gas_limit, 3_000_000);
        assert_eq!(parsed.sequence.len(), 2);
        assert!(parsed.wait_for_receipts);
        assert!(parsed.transcript_path.is_none());
    }

    #[test]
    fn invalid_step_is_rejected() {
        let value = serde_json::json!({ "sequence": ["selfdestruct"] });
        assert!(serde_json::from_value::<Config>(value).is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"wait_for_receipts\": false, \"request_timeout_secs\": 30 }}").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.wait_for_receipts);
        assert_eq!(
            config.request_timeout(),
            Some(std::time::Duration::from_secs(30))
        );

        let missing = Config::from_file(Path::new("/nonexistent/bank.json")).unwrap_err();
        assert!(matches!(missing, Error::Config(_)));
        assert!(missing.to_string().contains("/nonexistent/bank.json"));
    }
}
