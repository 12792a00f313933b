use super::{ActionError, ChainActionRunner};
use crate::chain::ChainClient;
use crate::utils::gas::bump;
use ethers::types::H256;
use tracing::info;

impl ChainActionRunner {
    /// Approves the StrategyManager for the swETH balance plus headroom.
    ///
    /// Returns `None` without any write when the current allowance already
    /// covers the balance.
    pub async fn approve_allowance_if_needed(
        &self,
        chain: &dyn ChainClient,
    ) -> Result<Option<H256>, ActionError> {
        let spender = self.addresses.strategy_manager;
        let balance = chain.token_balance().await?;
        let allowance = chain.allowance(spender).await?;

        if allowance >= balance {
            info!("Token already approved for EigenLayer (allowance {})", allowance);
            return Ok(None);
        }

        let amount = bump(balance, Self::APPROVAL_HEADROOM_PERCENT);
        let tx_hash = chain.approve(spender, amount).await?;

        info!("SUCCESS Token was approved for EigenLayer - {:?}", tx_hash);
        Ok(Some(tx_hash))
    }
}
