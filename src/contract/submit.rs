//! Signing, submission and confirmation of transactions

use crate::wallet::SigningContext;
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::rpc::json_rpc::ErrorPayload;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{Revert, SolError};
use alloy::transports::{RpcError, TransportErrorKind};
use serde::Serialize;

/// What a submission is for, used to classify node rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Deployment,
    Transaction,
}

impl Phase {
    fn error(self, message: String) -> Error {
        match self {
            Phase::Deployment => Error::Deployment(message),
            Phase::Transaction => Error::Transaction(message),
        }
    }
}

/// Receipt fields worth printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiptSummary {
    pub status: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Descriptor of a signed transaction accepted by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    pub nonce: u64,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub value: U256,
    pub input_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptSummary>,
}

/// Sign `request` with `context` and send it as a raw transaction
///
/// Returns as soon as the node accepts the transaction.
pub(crate) async fn submit<P: Provider>(
    provider: &P,
    context: SigningContext,
    request: TransactionRequest,
    phase: Phase,
) -> Result<SubmittedTransaction> {
    let from = context.address();
    let nonce = context.nonce();
    let to = request.to.and_then(|kind| kind.to().copied());
    let contract_address = match to {
        Some(_) => None,
        None => Some(from.create(nonce)),
    };
    let input_len = request.input.input().map(|b| b.len()).unwrap_or(0);

    let mut submitted = SubmittedTransaction {
        hash: TxHash::ZERO,
        from,
        to,
        contract_address,
        nonce,
        chain_id: context.chain_id(),
        gas_limit: context.gas().gas_limit,
        gas_price: context.gas().gas_price,
        value: context.value(),
        input_len,
        receipt: None,
    };

    let envelope = context
        .sign(request)
        .await
        .map_err(|e| phase.error(format!("Failed to sign transaction: {}", e)))?;
    submitted.hash = *envelope.tx_hash();

    let pending = provider
        .send_tx_envelope(envelope)
        .await
        .map_err(|e| classify_rpc_error(e, phase))?;

    if *pending.tx_hash() != submitted.hash {
        tracing::warn!(
            local = %submitted.hash,
            node = %pending.tx_hash(),
            "Node reported a different transaction hash"
        );
    }

    tracing::info!(
        hash = %submitted.hash,
        nonce,
        from = %from,
        "Transaction submitted"
    );

    Ok(submitted)
}

/// Block until `tx` is mined and record its receipt
///
/// A mined-but-reverted transaction is an error.
pub async fn await_receipt<P: Provider>(provider: &P, tx: &mut SubmittedTransaction) -> Result<()> {
    tracing::debug!(hash = %tx.hash, "Waiting for receipt");

    let receipt = PendingTransactionBuilder::new(provider.root().clone(), tx.hash)
        .get_receipt()
        .await
        .map_err(|e| Error::Network(format!("Failed to get receipt for {}: {}", tx.hash, e)))?;

    let summary = ReceiptSummary {
        status: receipt.status(),
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    };
    check_receipt(tx, summary)
}

/// Record `summary` on `tx`; a status-0 receipt is a deployment or
/// transaction error depending on what `tx` was
pub(crate) fn check_receipt(tx: &mut SubmittedTransaction, summary: ReceiptSummary) -> Result<()> {
    tx.receipt = Some(summary);

    if !summary.status {
        let phase = if tx.contract_address.is_some() {
            Phase::Deployment
        } else {
            Phase::Transaction
        };
        return Err(phase.error(format!(
            "{} reverted in block {}",
            tx.hash,
            summary
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        )));
    }

    tracing::info!(
        hash = %tx.hash,
        block = ?summary.block_number,
        gas_used = summary.gas_used,
        "Transaction confirmed"
    );
    Ok(())
}

/// Node rejections become `phase` errors; everything else is a network error
pub(crate) fn classify_rpc_error(error: RpcError<TransportErrorKind>, phase: Phase) -> Error {
    match &error {
        RpcError::ErrorResp(payload) => phase.error(rejection_message(payload)),
        _ => Error::Network(error.to_string()),
    }
}

fn rejection_message(payload: &ErrorPayload) -> String {
    if let Some(data) = payload.as_revert_data() {
        if let Ok(revert) = Revert::abi_decode(&data) {
            return format!("execution reverted: {}", revert.reason);
        }
    }
    parse_revert_reason(&payload.message)
}

/// Pull the human-readable reason out of a node's revert message
pub(crate) fn parse_revert_reason(error: &str) -> String {
    if let Some(start) = error.find("revert: ") {
        let reason = error[start + 8..].trim_end_matches('"');
        return format!("execution reverted: {}", reason);
    }
    if let Some(start) = error.find("execution reverted: ") {
        return error[start..].trim_end_matches('"').to_string();
    }
    // Hardhat: "... reverted with reason string 'insufficient balance'"
    if let Some(start) = error.find("reverted with reason string '") {
        let reason = &error[start + 29..];
        let reason = reason.strip_suffix('\'').unwrap_or(reason);
        return format!("execution reverted: {}", reason);
    }
    // Ganache: "VM Exception while processing transaction: revert <reason>"
    if let Some(start) = error.find("transaction: revert ") {
        return format!("execution reverted: {}", &error[start + 20..]);
    }
    if error.contains("execution reverted") || error.contains("VM Exception") {
        return "execution reverted".to_string();
    }

    // Nonce, funds and other rejections are reported as-is
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_revert_reason() {
        // Ganache style
        let error = "VM Exception while processing transaction: revert insufficient balance";
        assert_eq!(
            parse_revert_reason(error),
            "execution reverted: insufficient balance"
        );

        // Hardhat style
        let error = "VM Exception while processing transaction: reverted with reason string 'insufficient balance'";
        assert_eq!(
            parse_revert_reason(error),
            "execution reverted: insufficient balance"
        );

        let error = "VM Exception while processing transaction: invalid opcode";
        assert_eq!(parse_revert_reason(error), "execution reverted");

        let error = "VM Exception while processing transaction: revert: only admin";
        assert_eq!(parse_revert_reason(error), "execution reverted: only admin");

        // Geth / anvil style
        let error = "execution reverted: insufficient balance";
        assert_eq!(
            parse_revert_reason(error),
            "execution reverted: insufficient balance"
        );

        let error = "execution reverted";
        assert_eq!(parse_revert_reason(error), "execution reverted");

        let error = "nonce too low";
        assert_eq!(parse_revert_reason(error), "nonce too low");
    }

    #[test]
    fn test_revert_data_is_decoded() {
        let revert = Revert {
            reason: "insufficient balance".to_string(),
        };
        let payload = ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: Some(
                serde_json::value::to_raw_value(&alloy::primitives::Bytes::from(
                    revert.abi_encode(),
                ))
                .unwrap(),
            ),
        };

        assert_eq!(
            rejection_message(&payload),
            "execution reverted: insufficient balance"
        );
    }

    #[test]
    fn test_classify_rpc_error() {
        let rejected = RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "nonce too low".into(),
            data: None,
        });
        let err = classify_rpc_error(rejected, Phase::Transaction);
        assert_eq!(err.kind(), ErrorKind::Transaction);

        let rejected = RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
            data: None,
        });
        let err = classify_rpc_error(rejected, Phase::Deployment);
        assert_eq!(err.kind(), ErrorKind::Deployment);

        let transport = RpcError::Transport(TransportErrorKind::BackendGone);
        let err = classify_rpc_error(transport, Phase::Transaction);
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    fn submitted(contract_address: Option<Address>) -> SubmittedTransaction {
        SubmittedTransaction {
            hash: TxHash::repeat_byte(0x33),
            from: Address::repeat_byte(0x01),
            to: contract_address.is_none().then(|| Address::repeat_byte(0x02)),
            contract_address,
            nonce: 1,
            chain_id: 1337,
            gas_limit: 3_000_000,
            gas_price: 1_000_000,
            value: U256::ZERO,
            input_len: 36,
            receipt: None,
        }
    }

    #[test]
    fn test_successful_receipt_is_recorded() {
        let mut tx = submitted(None);
        let summary = ReceiptSummary {
            status: true,
            block_number: Some(12),
            gas_used: 43_000,
        };

        check_receipt(&mut tx, summary).unwrap();

        assert_eq!(tx.receipt, Some(summary));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["receipt"]["block_number"], 12);
    }

    #[test]
    fn test_reverted_write_is_transaction_error() {
        let mut tx = submitted(None);
        let summary = ReceiptSummary {
            status: false,
            block_number: Some(7),
            gas_used: 30_000,
        };

        let err = check_receipt(&mut tx, summary).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(err.to_string().contains("reverted in block 7"));
        assert_eq!(tx.receipt, Some(summary));
    }

    #[test]
    fn test_reverted_creation_is_deployment_error() {
        let mut tx = submitted(Some(Address::repeat_byte(0x05)));
        let summary = ReceiptSummary {
            status: false,
            block_number: None,
            gas_used: 3_000_000,
        };

        let err = check_receipt(&mut tx, summary).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Deployment);
        assert!(err.to_string().contains("reverted in block ?"));
    }
}
