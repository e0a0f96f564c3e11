//! Bank contract binding, deployment and calls

pub mod artifact;
mod calls;
mod deploy;
mod submit;

use alloy::sol;

pub use calls::{admin, balance, deposit, withdraw};
pub use deploy::{deploy, Deployment};
pub use submit::{await_receipt, ReceiptSummary, SubmittedTransaction};

sol! {
    /// Interface of `contracts/Bank.sol`
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Bank {
        function admin() external view returns (address);
        function balance() external view returns (uint256);
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
    }
}

/// Handle to a deployed Bank contract
pub type BankContract<P> = Bank::BankInstance<P>;

/// Attach to an already-deployed contract
pub fn attach<P: alloy::providers::Provider>(
    address: alloy::primitives::Address,
    provider: P,
) -> BankContract<P> {
    Bank::new(address, provider)
}
