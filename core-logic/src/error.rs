//! # Core Error Types
//!
//! Error definitions for the core-logic crate.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid range for '{field}': min {min} is greater than max {max}")]
    InvertedRange { field: String, min: String, max: String },
}

/// Account list loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("No private keys found in {path}")]
    Empty { path: String },

    #[error("Blank entry at line {line} of {path}")]
    BlankLine { path: String, line: usize },

    #[error("Key list has {keys} entries but address list has {addresses}")]
    ListLengthMismatch { keys: usize, addresses: usize },
}
