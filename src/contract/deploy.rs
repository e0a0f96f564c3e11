//! Contract deployment

use super::submit::{submit, Phase, SubmittedTransaction};
use super::{attach, BankContract};
use crate::wallet::SigningContext;
use crate::{Error, Result};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;

/// A submitted (not yet confirmed) deployment
pub struct Deployment<P> {
    /// Address the contract will live at
    pub address: Address,
    /// The creation transaction
    pub transaction: SubmittedTransaction,
    /// Handle bound to `address`
    pub contract: BankContract<P>,
}

impl<P> std::fmt::Debug for Deployment<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployment")
            .field("address", &self.address)
            .field("transaction", &self.transaction)
            .finish_non_exhaustive()
    }
}

/// Send a creation transaction for `bytecode` followed by ABI-encoded
/// `constructor_args`
///
/// The address is derived from the sender and nonce, so it is known before the
/// transaction is mined. Does not wait for confirmation.
pub async fn deploy<P: Provider + Clone>(
    context: SigningContext,
    provider: &P,
    bytecode: &Bytes,
    constructor_args: &[u8],
) -> Result<Deployment<P>> {
    if bytecode.is_empty() {
        return Err(Error::Deployment("empty creation bytecode".to_string()));
    }

    let address = context.address().create(context.nonce());

    let mut code = Vec::with_capacity(bytecode.len() + constructor_args.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(constructor_args);

    tracing::info!(
        %address,
        nonce = context.nonce(),
        chain_id = context.chain_id(),
        code_size = code.len(),
        "Deploying contract"
    );

    let request = TransactionRequest::default().with_deploy_code(Bytes::from(code));
    let transaction = submit(provider, context, request, Phase::Deployment).await?;

    Ok(Deployment {
        address,
        transaction,
        contract: attach(address, provider.clone()),
    })
}
