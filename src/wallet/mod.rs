//! Signing credentials and per-transaction options
//!
//! The private key never leaves this module.

mod context;
mod signer;

pub use context::SigningContext;
pub use signer::Credentials;
