use super::{ActionError, ChainActionRunner};
use crate::chain::{ChainClient, ChainError};
use ethers::types::H256;
use ethers::utils::format_ether;
use tracing::{error, info};

impl ChainActionRunner {
    /// Restakes the full swETH balance through the StrategyManager.
    ///
    /// Failures end here: they are logged and reported as `None`.
    pub async fn deposit_into_strategy(&self, chain: &dyn ChainClient) -> Option<H256> {
        match self.try_deposit_into_strategy(chain).await {
            Ok(tx_hash) => tx_hash,
            Err(ActionError::Chain(ChainError::InsufficientFunds(_))) => {
                error!("Not enough funds for EigenLayer deposit, try to set a lower gas ceiling");
                None
            }
            Err(e) => {
                error!("EigenLayer deposit FAILED: {}", e);
                None
            }
        }
    }

    async fn try_deposit_into_strategy(
        &self,
        chain: &dyn ChainClient,
    ) -> Result<Option<H256>, ActionError> {
        let balance = chain.token_balance().await?;
        if balance.is_zero() {
            info!("No swETH to restake, skipping EigenLayer deposit");
            return Ok(None);
        }

        let gas_price = self.bumped(chain.gas_price().await?);
        let tx_hash = chain
            .deposit_into_strategy(
                self.addresses.sweth_strategy,
                self.addresses.sweth_token,
                balance,
                gas_price,
            )
            .await?;

        info!(
            "SUCCESS {} swETH was restaked in EigenLayer - {:?}",
            format_ether(balance),
            tx_hash
        );
        Ok(Some(tx_hash))
    }
}
