//! # Core Logic - Shared Utilities for the Restake Runner
//!
//! This crate provides the chain-agnostic pieces used by the chain crates:
//! account loading, randomized delays, gas settings and logging.
//!
//! ## Modules
//!
//! - [`config`] - Shared configuration value types
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (wallet, delay, gas, logger)

pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

pub use config::{AmountRange, DelayRange};
pub use error::{ConfigError, WalletError};
pub use traits::Delayer;

pub use utils::{
    gwei_to_wei, random_amount, random_amount_with, random_duration, setup_logger, split_lines,
    wei_to_gwei, Account, GasConfig, GasConfigToml, RandomDelay, WalletManager,
};
