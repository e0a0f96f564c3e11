//! Contract bytecode artifacts
//!
//! Accepts the outputs of common Solidity toolchains:
//! - `solc --bin`: a bare hex string
//! - Foundry `out/Bank.sol/Bank.json`: `{"bytecode": {"object": "0x..."}}`
//! - Hardhat / Truffle: `{"bytecode": "0x..."}`
//! - solc standard JSON contract output: `{"evm": {"bytecode": {"object": "..."}}}`

use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::Bytes;
use serde_json::Value;
use std::path::Path;

/// Read creation bytecode from `path`
pub fn load_bytecode(path: &Path) -> Result<Bytes> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))?;
    let bytecode = parse_bytecode(&content)
        .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), inner_message(e))))?;

    tracing::debug!(path = %path.display(), size = bytecode.len(), "Loaded contract bytecode");
    Ok(bytecode)
}

/// Parse creation bytecode from hex text or a JSON artifact
pub fn parse_bytecode(content: &str) -> Result<Bytes> {
    let content = content.trim();

    let hex_str = if content.starts_with('{') {
        let json: Value = serde_json::from_str(content)?;
        bytecode_field(&json)
            .ok_or_else(|| Error::Artifact("no bytecode field in JSON artifact".to_string()))?
            .to_string()
    } else {
        content.to_string()
    };

    decode_hex(&hex_str)
}

fn bytecode_field(json: &Value) -> Option<&str> {
    let field = json
        .get("bytecode")
        .or_else(|| json.get("evm").and_then(|evm| evm.get("bytecode")))?;

    match field {
        Value::String(s) => Some(s),
        Value::Object(_) => field.get("object").and_then(Value::as_str),
        _ => None,
    }
}

fn decode_hex(input: &str) -> Result<Bytes> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(Error::Artifact(
            "bytecode is empty (abstract contract or interface?)".to_string(),
        ));
    }
    if trimmed.contains("__") {
        return Err(Error::Artifact(
            "bytecode has unlinked library placeholders".to_string(),
        ));
    }

    hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| Error::Artifact(format!("invalid hex: {}", e)))
}

fn inner_message(error: Error) -> String {
    match error {
        Error::Artifact(msg) => msg,
        other => other.to_string(),
    }
}
