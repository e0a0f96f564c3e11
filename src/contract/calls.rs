//! Read and write calls against a deployed Bank contract
//!
//! Reads are plain `eth_call`s and safe to repeat. Writes consume a fresh
//! [`SigningContext`] each, so two writes can never share a nonce.

use super::submit::{submit, Phase, SubmittedTransaction};
use super::BankContract;
use crate::wallet::SigningContext;
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;

/// Current admin address
pub async fn admin<P: Provider>(contract: &BankContract<P>) -> Result<Address> {
    contract
        .admin()
        .call()
        .await
        .map_err(|e| Error::Call(format!("admin(): {}", e)))
}

/// Current balance counter, in wei
pub async fn balance<P: Provider>(contract: &BankContract<P>) -> Result<U256> {
    contract
        .balance()
        .call()
        .await
        .map_err(|e| Error::Call(format!("balance(): {}", e)))
}

/// Submit `deposit(amount)`
pub async fn deposit<P: Provider>(
    contract: &BankContract<P>,
    context: SigningContext,
    amount: U256,
) -> Result<SubmittedTransaction> {
    tracing::debug!(%amount, nonce = context.nonce(), "Depositing");
    let request = contract.deposit(amount).into_transaction_request();
    submit(contract.provider(), context, request, Phase::Transaction).await
}

/// Submit `withdraw(amount)`
pub async fn withdraw<P: Provider>(
    contract: &BankContract<P>,
    context: SigningContext,
    amount: U256,
) -> Result<SubmittedTransaction> {
    tracing::debug!(%amount, nonce = context.nonce(), "Withdrawing");
    let request = contract.withdraw(amount).into_transaction_request();
    submit(contract.provider(), context, request, Phase::Transaction).await
}
