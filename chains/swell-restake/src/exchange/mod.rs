//! Custodial exchange side: sub-account sweep and on-chain withdrawal.

pub mod network;
pub mod okx;
pub mod withdrawal;

pub use network::OkxNetwork;
pub use okx::{OkxClient, OkxCredentials};
pub use withdrawal::{
    ExchangeWithdrawalManager, WithdrawalError, WithdrawalOrder, WithdrawalOutcome,
};

use async_trait::async_trait;
use thiserror::Error;

/// Failure classes reported by the exchange API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Usually the caller IP is not on the API key allow-list.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Destination is not on the withdrawal allow-list.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Withdrawals suspended: {0}")]
    WithdrawalSuspended(String),

    #[error("Unclassified exchange error {code}: {message}")]
    Unclassified { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("No {chain} chain listed for {currency}")]
    UnknownChain { currency: String, chain: String },
}

impl ExchangeError {
    /// Classes that clear up on their own or after operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::InsufficientFunds(_)
                | ExchangeError::PermissionDenied(_)
                | ExchangeError::InvalidAddress(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubAccountBalance {
    pub sub_account: String,
    pub currency: String,
    /// Decimal string exactly as reported, so the transfer moves all of it.
    pub available: String,
}

impl SubAccountBalance {
    pub fn is_empty(&self) -> bool {
        self.available
            .trim()
            .parse::<f64>()
            .map(|v| v <= 0.0)
            .unwrap_or(true)
    }
}

/// Chain identifier and fee for one currency/network pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalChain {
    pub chain: String,
    pub fee: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalRequest {
    pub currency: String,
    pub amount: String,
    pub address: String,
    pub chain: String,
    pub fee: String,
}

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn sub_accounts(&self) -> Result<Vec<String>, ExchangeError>;

    async fn sub_account_balances(
        &self,
        sub_account: &str,
        currency: &str,
    ) -> Result<Vec<SubAccountBalance>, ExchangeError>;

    /// Moves a sub-account balance into the master funding account.
    async fn transfer_to_master(&self, balance: &SubAccountBalance) -> Result<(), ExchangeError>;

    async fn withdrawal_chain(
        &self,
        currency: &str,
        network: OkxNetwork,
    ) -> Result<WithdrawalChain, ExchangeError>;

    /// Submits an on-chain withdrawal and returns the exchange withdrawal id.
    async fn withdraw(&self, request: &WithdrawalRequest) -> Result<String, ExchangeError>;
}
