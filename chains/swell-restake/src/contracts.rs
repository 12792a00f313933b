use ethers::abi::Abi;
use ethers::types::Address;
use serde::Deserialize;

/// Swell deposit contract; `deposit()` mints swETH 1:1 against the ETH sent.
pub const SWELL_DEPOSIT_ABI: &str = r#"[
    {"type":"function","name":"deposit","stateMutability":"payable","inputs":[],"outputs":[]}
]"#;

pub const ERC20_ABI: &str = r#"[
    {"type":"function","name":"balanceOf","stateMutability":"view","inputs":[{"name":"account","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"allowance","stateMutability":"view","inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"approve","stateMutability":"nonpayable","inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}]}
]"#;

/// EigenLayer StrategyManager entry point used for restaking.
pub const STRATEGY_MANAGER_ABI: &str = r#"[
    {"type":"function","name":"depositIntoStrategy","stateMutability":"nonpayable","inputs":[{"name":"strategy","type":"address"},{"name":"token","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"shares","type":"uint256"}]}
]"#;

#[derive(Debug, Clone)]
pub struct ContractAbis {
    pub swell_deposit: Abi,
    pub erc20: Abi,
    pub strategy_manager: Abi,
}

impl ContractAbis {
    pub fn load() -> Result<Self, serde_json::Error> {
        Ok(Self {
            swell_deposit: serde_json::from_str(SWELL_DEPOSIT_ABI)?,
            erc20: serde_json::from_str(ERC20_ABI)?,
            strategy_manager: serde_json::from_str(STRATEGY_MANAGER_ABI)?,
        })
    }
}

/// Deployed addresses, read from the `[contracts]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ContractAddresses {
    /// Payable deposit contract (swETH on mainnet).
    pub swell_deposit: Address,
    /// ERC-20 received from the deposit.
    pub sweth_token: Address,
    /// EigenLayer StrategyManager, also the approval spender.
    pub strategy_manager: Address,
    /// Strategy accepting `sweth_token`.
    pub sweth_strategy: Address,
}
