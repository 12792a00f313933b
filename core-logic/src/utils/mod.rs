//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod delay;
pub(crate) mod gas;
pub(crate) mod logger;
pub(crate) mod wallet_manager;

pub use delay::{random_amount, random_amount_with, random_duration, RandomDelay};
pub use gas::{gwei_to_wei, wei_to_gwei, GasConfig, GasConfigToml};
pub use logger::setup_logger;
pub use wallet_manager::{split_lines, Account, WalletManager};
