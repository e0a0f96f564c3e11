//! RPC endpoint configuration
//!
//! The node URL is resolved in priority order:
//! 1. `--rpc-url` on the command line
//! 2. `rpc_url` in the config file
//! 3. `RPC_URL` environment variable
//! 4. Local development node (`http://127.0.0.1:7545`)
//!
//! # Examples
//!
//! ```bash
//! export RPC_URL="http://127.0.0.1:8545"
//! ```

use crate::{Error, Result};
use alloy::providers::RootProvider;
use url::Url;

/// Environment variable holding the node URL
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Ganache's default HTTP endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7545";

/// Where the resolved URL came from, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcSource {
    Flag,
    ConfigFile,
    Environment,
    Default,
}

/// Resolved JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcConfig {
    url: Url,
    source: RpcSource,
}

impl RpcConfig {
    /// Resolve the endpoint from the flag, the config file and the environment
    pub fn resolve(flag: Option<&str>, file: Option<&str>) -> Result<Self> {
        let env = std::env::var(RPC_URL_ENV).ok();
        Self::resolve_with(flag, file, env.as_deref())
    }

    fn resolve_with(flag: Option<&str>, file: Option<&str>, env: Option<&str>) -> Result<Self> {
        let (raw, source) = if let Some(url) = flag {
            (url, RpcSource::Flag)
        } else if let Some(url) = file {
            (url, RpcSource::ConfigFile)
        } else if let Some(url) = env {
            (url, RpcSource::Environment)
        } else {
            tracing::debug!("No RPC URL configured, using local development node");
            (DEFAULT_RPC_URL, RpcSource::Default)
        };

        Ok(Self {
            url: parse_url(raw)?,
            source,
        })
    }

    /// Create with an explicit URL
    pub fn with_url(url: &str) -> Result<Self> {
        Ok(Self {
            url: parse_url(url)?,
            source: RpcSource::Flag,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn source(&self) -> RpcSource {
        self.source
    }

    /// Open an HTTP connection to the node
    ///
    /// No request is sent here; an unreachable node surfaces on first use.
    pub fn connect(&self) -> RootProvider {
        tracing::debug!(url = %self.url, source = ?self.source, "Connecting to node");
        RootProvider::new_http(self.url.clone())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url: Url = raw
        .parse()
        .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "Unsupported RPC URL scheme '{}', expected http or https",
            other
        ))),
    }
}
