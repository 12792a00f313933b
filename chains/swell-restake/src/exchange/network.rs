use std::fmt;
use std::str::FromStr;

/// Withdrawal networks supported by the OKX chain naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkxNetwork {
    Arbitrum,
    Base,
    Ethereum,
    Linea,
    Optimism,
    ZkSync,
}

impl OkxNetwork {
    /// Chain name as OKX spells it after the currency prefix.
    pub fn okx_name(&self) -> &'static str {
        match self {
            OkxNetwork::Arbitrum => "Arbitrum One",
            OkxNetwork::Base => "Base",
            OkxNetwork::Ethereum => "ERC20",
            OkxNetwork::Linea => "Linea",
            OkxNetwork::Optimism => "Optimism",
            OkxNetwork::ZkSync => "zkSync Era",
        }
    }

    /// OKX chain identifier, e.g. `ETH-ERC20` or `ETH-Arbitrum One`.
    pub fn chain_id(&self, currency: &str) -> String {
        format!("{}-{}", currency, self.okx_name())
    }
}

impl FromStr for OkxNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arbitrum" => Ok(OkxNetwork::Arbitrum),
            "base" => Ok(OkxNetwork::Base),
            "ethereum" => Ok(OkxNetwork::Ethereum),
            "linea" => Ok(OkxNetwork::Linea),
            "optimism" => Ok(OkxNetwork::Optimism),
            "zksync" => Ok(OkxNetwork::ZkSync),
            other => Err(format!(
                "unknown network '{}' (expected arbitrum, base, ethereum, linea, optimism or zkSync)",
                other
            )),
        }
    }
}

impl fmt::Display for OkxNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OkxNetwork::Arbitrum => "arbitrum",
            OkxNetwork::Base => "base",
            OkxNetwork::Ethereum => "ethereum",
            OkxNetwork::Linea => "linea",
            OkxNetwork::Optimism => "optimism",
            OkxNetwork::ZkSync => "zkSync",
        };
        write!(f, "{}", name)
    }
}
