//! Signing credentials
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are read from the environment as a `SecretString`, never from source
//! - Keys are never serialized, logged or shown by `Debug`

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{keccak256, Address};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use secrecy::{ExposeSecret, SecretString};

/// Parsed private key plus the address derived from it
#[derive(Clone)]
pub struct Credentials {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy transaction signing
    wallet: EthereumWallet,
}

impl Credentials {
    /// Load credentials from an environment variable
    ///
    /// The variable should contain a hex-encoded secp256k1 private key.
    pub fn from_env(var_name: &str) -> Result<Self> {
        let secret: SecretString = std::env::var(var_name)
            .map_err(|_| {
                Error::Credential(format!(
                    "Environment variable {} not set. Required for signing.",
                    var_name
                ))
            })?
            .into();

        Self::from_secret(&secret)
    }

    pub fn from_secret(secret: &SecretString) -> Result<Self> {
        Self::from_hex(secret.expose_secret())
    }

    /// Parse a hex-encoded private key (with or without `0x`)
    ///
    /// Purely local: no network access happens here.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        if key_hex.len() != 64 {
            return Err(Error::Credential(format!(
                "Invalid private key: expected 64 hex characters, got {}",
                key_hex.len()
            )));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Credential(format!("Invalid private key: {}", e)))?;

        let address = recover_address(&signer)?;
        let wallet = EthereumWallet::from(signer);

        Ok(Self { address, wallet })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the address as a checksummed string
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

/// Derive the signer's address by signing a fixed hash and recovering the
/// public key from the signature.
fn recover_address(signer: &PrivateKeySigner) -> Result<Address> {
    let check = keccak256(b"bank-deployer key check");
    let signature = signer
        .sign_hash_sync(&check)
        .map_err(|e| Error::Logic(format!("Key check signature failed: {}", e)))?;
    let recovered = signature
        .recover_address_from_prehash(&check)
        .map_err(|e| Error::Logic(format!("Public key recovery failed: {}", e)))?;

    if recovered != signer.address() {
        return Err(Error::Logic(format!(
            "Recovered address {} does not match signer address {}",
            recovered,
            signer.address()
        )));
    }

    Ok(recovered)
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
