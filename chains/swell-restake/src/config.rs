use crate::batch::{BatchSettings, Features};
use crate::contracts::ContractAddresses;
use crate::exchange::{OkxCredentials, OkxNetwork};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use core_logic::{AmountRange, ConfigError, DelayRange, GasConfig, GasConfigToml, WalletManager};
use ethers::types::U256;
use ethers::utils::parse_ether;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Clone)]
pub struct RestakeConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default)]
    pub shuffle: bool,
    /// ETH kept on each wallet after the Swell deposit.
    #[serde(default)]
    pub remain_eth: f64,
    pub gas: GasConfigToml,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub delays: DelaysConfig,
    #[serde(default)]
    pub okx: OkxConfig,
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub files: FilesConfig,
}

fn default_chain_id() -> u64 {
    1
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DelaysConfig {
    pub after_action: DelayRange,
    pub after_wallet: DelayRange,
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self {
            after_action: DelayRange::new(30, 60),
            after_wallet: DelayRange::new(120, 300),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct OkxConfig {
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
    /// Withdrawal amount bounds; the actual amount is drawn per wallet.
    pub amount: AmountRange,
    pub currency: String,
    pub network: String,
    pub max_attempts: Option<u32>,
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret: String::new(),
            passphrase: String::new(),
            amount: AmountRange::default(),
            currency: "ETH".to_string(),
            network: "ethereum".to_string(),
            max_attempts: None,
        }
    }
}

impl fmt::Debug for OkxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkxConfig")
            .field("api_key", &self.api_key)
            .field("secret", &"***REDACTED***")
            .field("passphrase", &"***REDACTED***")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("network", &self.network)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilesConfig {
    pub private_keys: String,
    pub addresses: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            private_keys: WalletManager::PV_FILE.to_string(),
            addresses: WalletManager::ADDRESSES_FILE.to_string(),
        }
    }
}

impl RestakeConfig {
    /// Reads the TOML file, then applies `RESTAKE__SECTION__KEY` overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("RESTAKE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid config {}", path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if reqwest::Url::parse(&self.rpc_url).is_err() {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
            });
        }
        if !self.gas.max_gwei.is_finite() || self.gas.max_gwei <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "gas.max_gwei".to_string(),
                reason: format!("expected a positive ceiling, got {}", self.gas.max_gwei),
            });
        }
        self.delays.after_action.validate("delays.after_action")?;
        self.delays.after_wallet.validate("delays.after_wallet")?;
        self.remain_wei()?;
        self.network()?;

        if self.features.cex_withdrawal {
            for (field, value) in [
                ("okx.api_key", &self.okx.api_key),
                ("okx.secret", &self.okx.secret),
                ("okx.passphrase", &self.okx.passphrase),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: field.to_string(),
                    });
                }
            }
            self.okx.amount.validate("okx.amount")?;
            if self.okx.max_attempts == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "okx.max_attempts".to_string(),
                    reason: "must be at least 1 when set".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn gas_config(&self) -> GasConfig {
        self.gas.clone().into()
    }

    pub fn remain_wei(&self) -> Result<U256, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "remain_eth".to_string(),
            reason,
        };
        if !self.remain_eth.is_finite() || self.remain_eth < 0.0 {
            return Err(invalid(format!(
                "expected a non-negative amount, got {}",
                self.remain_eth
            )));
        }
        parse_ether(self.remain_eth).map_err(|e| invalid(e.to_string()))
    }

    pub fn network(&self) -> Result<OkxNetwork, ConfigError> {
        self.okx
            .network
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "okx.network".to_string(),
                reason,
            })
    }

    /// Present only when all three OKX secrets are filled in.
    pub fn okx_credentials(&self) -> Option<OkxCredentials> {
        let okx = &self.okx;
        if okx.api_key.is_empty() || okx.secret.is_empty() || okx.passphrase.is_empty() {
            return None;
        }
        Some(OkxCredentials {
            api_key: okx.api_key.clone(),
            secret: okx.secret.clone(),
            passphrase: okx.passphrase.clone(),
        })
    }

    pub fn batch_settings(&self) -> Result<BatchSettings, ConfigError> {
        Ok(BatchSettings {
            features: self.features,
            after_action: self.delays.after_action,
            after_wallet: self.delays.after_wallet,
            remain_wei: self.remain_wei()?,
            withdraw_amount: self.okx.amount,
            currency: self.okx.currency.clone(),
            network: self.network()?,
            shuffle: self.shuffle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
rpc_url = "https://eth.llamarpc.com"
shuffle = true
remain_eth = 0.01

[gas]
max_gwei = 25.0

[features]
cex_withdrawal = true

[delays]
after_action = { min = 10, max = 20 }
after_wallet = { min = 60, max = 120 }

[okx]
api_key = "key"
secret = "secret"
passphrase = "pass"
amount = { min = 0.01, max = 0.02 }
network = "Arbitrum"

[contracts]
swell_deposit = "0xf951E335afb289353dc249e82926178EaC7DEd78"
sweth_token = "0xf951E335afb289353dc249e82926178EaC7DEd78"
strategy_manager = "0x858646372CC42E1A627fcE94aa7A7033e7CF075A"
sweth_strategy = "0x0Fe4F44beE93503346A3Ac9EE5A26b130a5796d6"
"#;

    fn load_sample(body: &str) -> RestakeConfig {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        RestakeConfig::load(file.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_load_sample_with_defaults() {
        let config = load_sample(SAMPLE);
        assert_eq!(config.chain_id, 1);
        assert!(config.shuffle);
        assert!(config.features.cex_withdrawal);
        assert!(config.features.swell_deposit);
        assert_eq!(config.okx.currency, "ETH");
        assert_eq!(config.files.private_keys, "private.txt");
        assert_eq!(config.network().unwrap(), OkxNetwork::Arbitrum);
        assert_eq!(config.remain_wei().unwrap(), parse_ether("0.01").unwrap());
        assert!(config.validate().is_ok());

        let settings = config.batch_settings().unwrap();
        assert_eq!(settings.after_action, DelayRange::new(10, 20));
        assert_eq!(settings.withdraw_amount.max, 0.02);
    }

    #[test]
    fn test_missing_credentials_rejected_when_cex_enabled() {
        let mut config = load_sample(SAMPLE);
        config.okx.secret.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField {
                field: "okx.secret".to_string()
            })
        );
        assert!(config.okx_credentials().is_none());

        config.features.cex_withdrawal = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = load_sample(SAMPLE);
        config.delays.after_wallet = DelayRange::new(300, 100);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));

        let mut config = load_sample(SAMPLE);
        config.okx.network = "solana".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = load_sample(SAMPLE);
        config.remain_eth = -1.0;
        assert!(config.validate().is_err());

        let mut config = load_sample(SAMPLE);
        config.rpc_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRpcUrl { .. })
        ));
    }

    #[test]
    fn test_env_overrides_keep_secrets_verbatim() {
        std::env::set_var("RESTAKE__OKX__PASSPHRASE", "0123456");
        std::env::set_var("RESTAKE__OKX__SECRET", "1e5");
        std::env::set_var("RESTAKE__OKX__MAX_ATTEMPTS", "3");
        let config = load_sample(SAMPLE);
        std::env::remove_var("RESTAKE__OKX__PASSPHRASE");
        std::env::remove_var("RESTAKE__OKX__SECRET");
        std::env::remove_var("RESTAKE__OKX__MAX_ATTEMPTS");

        assert_eq!(config.okx.passphrase, "0123456");
        assert_eq!(config.okx.secret, "1e5");
        // Numeric fields are still converted from the env string.
        assert_eq!(config.okx.max_attempts, Some(3));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load_sample(SAMPLE);
        let rendered = format!("{:?}", config.okx);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("REDACTED"));
    }
}
