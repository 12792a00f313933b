//! Signer/provider abstraction used by the gas gate and the on-chain steps.
//!
//! Every write method blocks until the transaction is mined and returns its
//! hash; a reverted or dropped transaction is an error.

pub mod ethers_client;

pub use ethers_client::{EthersChainClient, EthersConnector};

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// The node rejected the transaction for lack of balance.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Submission, confirmation or contract-call failure.
    #[error("Chain call failed: {0}")]
    Call(String),

    /// Read-only RPC failure (gas price, balances, estimates).
    #[error("RPC fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

impl ChainError {
    /// Maps a raw provider/middleware error onto the taxonomy above.
    pub fn from_send(err: impl std::fmt::Display) -> Self {
        let msg = err.to_string();
        if is_insufficient_funds(&msg) {
            ChainError::InsufficientFunds(msg)
        } else {
            ChainError::Call(msg)
        }
    }

    pub fn from_fetch(err: impl std::fmt::Display) -> Self {
        let msg = err.to_string();
        if is_insufficient_funds(&msg) {
            ChainError::InsufficientFunds(msg)
        } else {
            ChainError::Fetch(msg)
        }
    }
}

/// Node error strings seen for balance shortfalls (geth, erigon, nethermind).
pub fn is_insufficient_funds(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    [
        "insufficient funds",
        "insufficient balance",
        "sender doesn't have enough funds",
    ]
    .iter()
    .any(|pattern| msg.contains(pattern))
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signer.
    fn address(&self) -> Address;

    async fn gas_price(&self) -> Result<U256, ChainError>;

    async fn balance(&self) -> Result<U256, ChainError>;

    /// Gas estimate for a Swell `deposit()` carrying `value` wei.
    async fn estimate_deposit(&self, value: U256) -> Result<U256, ChainError>;

    async fn deposit(
        &self,
        value: U256,
        gas_limit: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError>;

    /// swETH balance of the signer.
    async fn token_balance(&self) -> Result<U256, ChainError>;

    async fn allowance(&self, spender: Address) -> Result<U256, ChainError>;

    async fn approve(&self, spender: Address, amount: U256) -> Result<H256, ChainError>;

    async fn deposit_into_strategy(
        &self,
        strategy: Address,
        token: Address,
        amount: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError>;
}

/// Builds a signing client for one account's private key.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, private_key: &str) -> Result<Arc<dyn ChainClient>, ChainError>;
}
