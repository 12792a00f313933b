use super::{ActionError, ChainActionRunner};
use crate::chain::ChainClient;
use ethers::types::{H256, U256};
use ethers::utils::format_ether;
use tracing::info;

impl ChainActionRunner {
    /// Deposits the whole ETH balance into Swell except `remain` and the gas.
    ///
    /// Gas is budgeted from a 1 wei trial estimate at the bumped price; the
    /// real transaction then uses its own estimate as the gas limit.
    pub async fn deposit_remainder(
        &self,
        chain: &dyn ChainClient,
        remain: U256,
    ) -> Result<H256, ActionError> {
        let balance = chain.balance().await?;
        let trial_gas = chain.estimate_deposit(U256::one()).await?;
        let gas_price = self.bumped(chain.gas_price().await?);

        let amount = spendable_amount(balance, trial_gas, gas_price, remain).ok_or(
            ActionError::InsufficientBalance {
                balance,
                reserved: trial_gas.saturating_mul(gas_price).saturating_add(remain),
            },
        )?;

        let gas_limit = chain.estimate_deposit(amount).await?;
        let tx_hash = chain.deposit(amount, gas_limit, gas_price).await?;

        info!(
            "SUCCESS {} ETH was deposited in Swell - {:?}",
            format_ether(amount),
            tx_hash
        );
        Ok(tx_hash)
    }
}

/// `balance - (trial_gas * gas_price + remain)`, or `None` when nothing is left.
pub fn spendable_amount(
    balance: U256,
    trial_gas: U256,
    gas_price: U256,
    remain: U256,
) -> Option<U256> {
    let reserved = trial_gas.checked_mul(gas_price)?.checked_add(remain)?;
    balance.checked_sub(reserved).filter(|amount| !amount.is_zero())
}
