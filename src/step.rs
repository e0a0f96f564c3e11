//! Contract steps and wei amount parsing
//!
//! Steps are written as short strings so a sequence can live in the config
//! file or on the command line:
//!
//! ```text
//! admin
//! balance
//! deposit 2 ether
//! withdraw 1000000000000000000
//! ```

use crate::{Error, Result};
use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One operation against the deployed contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Step {
    /// Read the contract's admin address
    Admin,
    /// Read the contract's balance counter
    Balance,
    /// Credit the balance (state-changing)
    Deposit(U256),
    /// Debit the balance (state-changing)
    Withdraw(U256),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Admin => "admin",
            Step::Balance => "balance",
            Step::Deposit(_) => "deposit",
            Step::Withdraw(_) => "withdraw",
        }
    }

    /// Whether the step submits a transaction and needs a fresh nonce
    pub fn is_write(&self) -> bool {
        matches!(self, Step::Deposit(_) | Step::Withdraw(_))
    }

    /// Admin, Balance, Deposit(2 ether), Withdraw(1 ether), Balance
    pub fn default_sequence() -> Vec<Step> {
        let ether = U256::from(10u64).pow(U256::from(18u64));
        vec![
            Step::Admin,
            Step::Balance,
            Step::Deposit(ether * U256::from(2u64)),
            Step::Withdraw(ether),
            Step::Balance,
        ]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Admin | Step::Balance => f.write_str(self.name()),
            Step::Deposit(amount) | Step::Withdraw(amount) => {
                write!(f, "{} {}", self.name(), amount)
            }
        }
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (verb, rest) = match s.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (s, ""),
        };

        let step = match verb.to_lowercase().as_str() {
            "admin" => Step::Admin,
            "balance" => Step::Balance,
            "deposit" => Step::Deposit(parse_amount(rest)?),
            "withdraw" => Step::Withdraw(parse_amount(rest)?),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Unknown step '{}'. Use admin, balance, deposit <amount> or withdraw <amount>",
                    verb
                )))
            }
        };

        if !step.is_write() && !rest.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "Step '{}' takes no amount",
                verb
            )));
        }

        Ok(step)
    }
}

impl TryFrom<String> for Step {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        step.to_string()
    }
}

/// Parse a wei amount, optionally suffixed with a unit (`wei`, `gwei`, `ether`)
pub fn parse_amount(input: &str) -> Result<U256> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidArgument("Missing amount".to_string()));
    }
    if input.starts_with('-') {
        return Err(Error::InvalidArgument(format!(
            "Amount must not be negative: {}",
            input
        )));
    }

    // Hex amounts are plain wei
    if input.starts_with("0x") {
        return U256::from_str(input)
            .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", input, e)));
    }

    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let number = number.trim();

    let decimals: u8 = match unit.trim().to_lowercase().as_str() {
        "" | "wei" => 0,
        "gwei" => 9,
        "eth" | "ether" => 18,
        other => {
            return Err(Error::InvalidArgument(format!(
                "Unknown unit '{}'. Use wei, gwei or ether",
                other
            )))
        }
    };

    if decimals == 0 {
        return U256::from_str_radix(number, 10)
            .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", input, e)));
    }

    parse_units(number, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", input, e)))
}
