use crate::chain::ChainClient;
use core_logic::{wei_to_gwei, Delayer, GasConfig};
use ethers::types::U256;
use std::sync::Arc;
use tracing::{info, warn};

/// Blocks until the network gas price is at or below the configured ceiling.
#[derive(Clone)]
pub struct GasGate {
    config: GasConfig,
    delayer: Arc<dyn Delayer>,
}

impl GasGate {
    pub fn new(config: GasConfig, delayer: Arc<dyn Delayer>) -> Self {
        Self { config, delayer }
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Polls until the price is acceptable and returns it in gwei.
    ///
    /// There is no timeout. Fetch failures are logged and the poll starts over
    /// after the regular interval.
    pub async fn await_acceptable_gas(&self, chain: &dyn ChainClient) -> f64 {
        let ceiling = U256::from(self.config.max_wei());
        let interval = self.config.poll_interval.as_secs();

        loop {
            match chain.gas_price().await {
                Ok(price) => {
                    let gwei = wei_to_gwei(price.low_u128());
                    info!(
                        "Checking gas: {:.3} gwei. Ceiling: {} gwei",
                        gwei,
                        self.config.max_gwei()
                    );
                    if price <= ceiling {
                        return gwei;
                    }
                }
                Err(e) => {
                    warn!("Gas price fetch failed, polling again: {}", e);
                }
            }

            self.delayer.wait(interval, interval).await;
        }
    }
}

/// `value * percent / 100` in integer arithmetic, e.g. 105 -> +5%.
pub fn bump(value: U256, percent: u64) -> U256 {
    value * U256::from(percent) / U256::from(100u64)
}
