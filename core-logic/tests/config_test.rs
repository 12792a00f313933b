use core_logic::config::{AmountRange, DelayRange};
use core_logic::{ConfigError, GasConfig, GasConfigToml};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DelaysSection {
    after_action: DelayRange,
    after_wallet: DelayRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_ranges_deserialize() {
        let json = r#"{
            "after_action": { "min": 30, "max": 90 },
            "after_wallet": { "min": 600, "max": 1800 }
        }"#;
        let delays: DelaysSection = serde_json::from_str(json).unwrap();

        assert_eq!(delays.after_action, DelayRange::new(30, 90));
        assert_eq!(delays.after_wallet.max, 1800);
        assert!(delays.after_wallet.validate("delays.after_wallet").is_ok());
    }

    #[test]
    fn test_inverted_delay_range_reports_field() {
        let err = DelayRange::new(90, 30)
            .validate("delays.after_action")
            .unwrap_err();

        match err {
            ConfigError::InvertedRange { field, min, max } => {
                assert_eq!(field, "delays.after_action");
                assert_eq!(min, "90");
                assert_eq!(max, "30");
            }
            other => panic!("Expected InvertedRange, got {:?}", other),
        }
    }

    #[test]
    fn test_amount_range_equal_bounds() {
        let range = AmountRange {
            min: 0.05,
            max: 0.05,
        };
        assert!(range.validate("okx.amount").is_ok());
    }

    #[test]
    fn test_amount_range_rejects_nan() {
        let range = AmountRange {
            min: f64::NAN,
            max: 1.0,
        };
        assert!(matches!(
            range.validate("okx.amount"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_gas_config_from_toml() {
        let config: GasConfig = GasConfigToml {
            max_gwei: 12.0,
            poll_interval_secs: Some(3),
            price_bump_percent: Some(110),
        }
        .into();

        assert_eq!(config.max_gwei(), 12.0);
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.price_bump_percent, 110);
    }

    #[test]
    fn test_gas_config_builder() {
        let config = GasConfig::new()
            .with_max_gwei(7.5)
            .with_poll_interval(Duration::from_secs(1));

        assert_eq!(config.max_wei(), 7_500_000_000);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }
}
