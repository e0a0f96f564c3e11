//! Per-transaction signing context
//!
//! A [`SigningContext`] pairs the credentials with a nonce fetched from the
//! node. It is consumed by [`SigningContext::sign`], so every state-changing
//! call has to build a fresh one and therefore observe the latest pending
//! nonce.

use super::Credentials;
use crate::config::GasConfig;
use crate::{Error, Result};
use alloy::consensus::TxEnvelope;
use alloy::network::{Ethereum, TransactionBuilder, TransactionBuilderError};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;

/// Signer plus the transaction options for exactly one transaction
#[derive(Debug)]
pub struct SigningContext {
    credentials: Credentials,
    nonce: u64,
    chain_id: u64,
    gas: GasConfig,
}

impl SigningContext {
    /// Assemble a context from already-known values
    pub fn new(credentials: Credentials, nonce: u64, chain_id: u64, gas: GasConfig) -> Self {
        Self {
            credentials,
            nonce,
            chain_id,
            gas,
        }
    }

    /// Parse `key_hex` and build a context against the node
    ///
    /// The key is validated before any request is sent.
    pub async fn from_hex<P: Provider>(provider: &P, key_hex: &str, gas: GasConfig) -> Result<Self> {
        let credentials = Credentials::from_hex(key_hex)?;
        Self::build(provider, &credentials, gas).await
    }

    /// Fetch the pending nonce and chain id for `credentials`
    pub async fn build<P: Provider>(
        provider: &P,
        credentials: &Credentials,
        gas: GasConfig,
    ) -> Result<Self> {
        let address = credentials.address();

        let nonce = provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| Error::Network(format!("Failed to fetch nonce for {}: {}", address, e)))?;

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Network(format!("Failed to fetch chain id: {}", e)))?;

        tracing::debug!(%address, nonce, chain_id, "Built signing context");

        Ok(Self::new(credentials.clone(), nonce, chain_id, gas))
    }

    pub fn address(&self) -> Address {
        self.credentials.address()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas(&self) -> &GasConfig {
        &self.gas
    }

    pub fn value(&self) -> U256 {
        self.gas.value
    }

    /// Fill sender, nonce, chain id, gas and value into `tx`
    pub fn apply(&self, tx: TransactionRequest) -> TransactionRequest {
        tx.with_from(self.address())
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(self.gas.gas_limit)
            .with_gas_price(self.gas.gas_price)
            .with_value(self.gas.value)
    }

    /// Apply the options to `tx` and sign it, consuming the context
    pub async fn sign(
        self,
        tx: TransactionRequest,
    ) -> std::result::Result<TxEnvelope, TransactionBuilderError<Ethereum>> {
        let tx = self.apply(tx);
        tx.build(self.credentials.wallet()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloy::consensus::Transaction;
    use alloy::primitives::{address, Bytes, U64};
    use alloy::providers::ProviderBuilder;
    use alloy::transports::mock::Asserter;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn mocked(asserter: &Asserter) -> impl Provider {
        ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
    }

    #[tokio::test]
    async fn test_build_fetches_nonce_and_chain_id() {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(7));
        asserter.push_success(&U64::from(1337));
        let provider = mocked(&asserter);

        let context = SigningContext::from_hex(&provider, TEST_KEY, GasConfig::default())
            .await
            .unwrap();

        assert_eq!(context.nonce(), 7);
        assert_eq!(context.chain_id(), 1337);
        assert_eq!(
            context.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[tokio::test]
    async fn test_consecutive_contexts_follow_pending_nonce() {
        let asserter = Asserter::new();
        let provider = mocked(&asserter);
        let credentials = Credentials::from_hex(TEST_KEY).unwrap();

        asserter.push_success(&U64::from(3));
        asserter.push_success(&U64::from(1337));
        let first = SigningContext::build(&provider, &credentials, GasConfig::default())
            .await
            .unwrap();

        // The node has accepted one transaction since
        asserter.push_success(&U64::from(4));
        asserter.push_success(&U64::from(1337));
        let second = SigningContext::build(&provider, &credentials, GasConfig::default())
            .await
            .unwrap();

        assert!(second.nonce() > first.nonce());
    }

    #[tokio::test]
    async fn test_malformed_key_fails_before_network() {
        // No responses queued: any request would fail as a network error
        let asserter = Asserter::new();
        let provider = mocked(&asserter);

        let err = SigningContext::from_hex(&provider, "0xnot-a-key", GasConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Credential);
    }

    #[tokio::test]
    async fn test_rpc_failure_is_network_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("connection reset");
        let provider = mocked(&asserter);

        let err = SigningContext::from_hex(&provider, TEST_KEY, GasConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_apply_sets_fixed_options() {
        let credentials = Credentials::from_hex(TEST_KEY).unwrap();
        let context = SigningContext::new(credentials, 9, 1337, GasConfig::default());

        let tx = context.apply(TransactionRequest::default());

        assert_eq!(tx.from, Some(context.address()));
        assert_eq!(tx.nonce, Some(9));
        assert_eq!(tx.chain_id, Some(1337));
        assert_eq!(tx.gas, Some(3_000_000));
        assert_eq!(tx.gas_price, Some(1_000_000));
        assert_eq!(tx.value, Some(U256::ZERO));
    }

    #[tokio::test]
    async fn test_sign_produces_legacy_transaction() {
        let credentials = Credentials::from_hex(TEST_KEY).unwrap();
        let context = SigningContext::new(credentials, 2, 1337, GasConfig::default());

        let tx = TransactionRequest::default()
            .with_to(address!("5FbDB2315678afecb367f032d93F642f64180aa3"))
            .with_input(Bytes::from_static(&[0xd0, 0xe3, 0x0d, 0xb0]));
        let envelope = context.sign(tx).await.unwrap();

        assert!(envelope.is_legacy());
        assert_eq!(envelope.nonce(), 2);
        assert_eq!(envelope.gas_limit(), 3_000_000);
        assert_eq!(envelope.gas_price(), Some(1_000_000));
        assert_eq!(envelope.chain_id(), Some(1337));
        assert_eq!(envelope.value(), U256::ZERO);
    }
}
