//! On-chain steps of the restake pipeline.
//!
//! Each step reads fresh state through [`ChainClient`] and waits for its
//! transaction to be mined before returning.

pub mod t01_swell_deposit;
pub mod t02_approve_eigen;
pub mod t03_eigen_deposit;

pub use t01_swell_deposit::spendable_amount;

use crate::chain::ChainError;
use crate::contracts::ContractAddresses;
use ethers::types::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Balance {balance} wei does not cover gas and the reserve ({reserved} wei)")]
    InsufficientBalance { balance: U256, reserved: U256 },
}

pub struct ChainActionRunner {
    addresses: ContractAddresses,
    price_bump_percent: u64,
}

impl ChainActionRunner {
    /// Allowance is raised to 110% of the balance so later rewards still fit.
    pub const APPROVAL_HEADROOM_PERCENT: u64 = 110;

    pub fn new(addresses: ContractAddresses, price_bump_percent: u64) -> Self {
        Self {
            addresses,
            price_bump_percent,
        }
    }

    pub fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    fn bumped(&self, gas_price: U256) -> U256 {
        crate::utils::gas::bump(gas_price, self.price_bump_percent)
    }
}
