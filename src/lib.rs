//! Bank contract deployer
//!
//! Deploys a minimal Bank contract to an Ethereum-compatible node and drives
//! its methods:
//! - `admin()` and `balance()` reads
//! - `deposit(amount)` and `withdraw(amount)` writes, each signed with a
//!   freshly fetched nonce
//!
//! # Security Model
//!
//! - The private key comes from the environment, never from source or config
//! - Keys stay inside the `wallet` module and are never logged

pub mod config;
pub mod contract;
pub mod runner;
pub mod step;
pub mod transcript;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{Config, GasConfig, RpcConfig, PRIVATE_KEY_ENV};
pub use error::{Error, ErrorKind, Result};
pub use runner::{RunReport, Runner};
pub use step::Step;
