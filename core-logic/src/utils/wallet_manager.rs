use crate::error::WalletError;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A signing key paired with the exchange withdrawal destination.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    pub private_key: String,
    pub destination: String,
}

impl Account {
    pub fn new(private_key: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("destination", &self.destination)
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

pub struct WalletManager;

impl WalletManager {
    pub const PV_FILE: &'static str = "private.txt";
    pub const ADDRESSES_FILE: &'static str = "addresses.txt";

    /// Reads the key list and the address list and pairs them by line number.
    pub fn load_accounts(
        keys_path: impl AsRef<Path>,
        addresses_path: impl AsRef<Path>,
    ) -> Result<Vec<Account>, WalletError> {
        let keys_path = keys_path.as_ref();
        let keys = Self::read_lines(keys_path)?;
        if keys.is_empty() {
            return Err(WalletError::Empty {
                path: keys_path.display().to_string(),
            });
        }
        let addresses = Self::read_lines(addresses_path.as_ref())?;

        Self::pair(keys, addresses)
    }

    /// Positional pairing; both lists must have the same length.
    pub fn pair(keys: Vec<String>, addresses: Vec<String>) -> Result<Vec<Account>, WalletError> {
        if keys.len() != addresses.len() {
            return Err(WalletError::ListLengthMismatch {
                keys: keys.len(),
                addresses: addresses.len(),
            });
        }

        Ok(keys
            .into_iter()
            .zip(addresses)
            .map(|(key, address)| Account::new(key, address))
            .collect())
    }

    fn read_lines(path: &Path) -> Result<Vec<String>, WalletError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => WalletError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => WalletError::IoError {
                path: path.display().to_string(),
                msg: e.to_string(),
            },
        })?;

        split_lines(&content).map_err(|line| WalletError::BlankLine {
            path: path.display().to_string(),
            line,
        })
    }
}

/// Normalizes CR-LF, drops trailing blank lines and trims every entry.
///
/// A blank line in the middle would shift every later pairing, so it is
/// reported by its 1-based line number instead.
pub fn split_lines(content: &str) -> Result<Vec<String>, usize> {
    let normalized = content.replace("\r\n", "\n");
    let mut lines: Vec<&str> = normalized.split('\n').map(str::trim).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if let Some(pos) = lines.iter().position(|l| l.is_empty()) {
        return Err(pos + 1);
    }

    Ok(lines.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_crlf() {
        let lines = split_lines("0xaa\r\n0xbb\r\n\r\n").unwrap();
        assert_eq!(lines, vec!["0xaa", "0xbb"]);
    }

    #[test]
    fn test_split_lines_blank_in_middle() {
        assert_eq!(split_lines("a\n\nb\n"), Err(2));
    }

    #[test]
    fn test_account_debug_redacts_key() {
        let account = Account::new("deadbeef", "0x1234");
        let printed = format!("{:?}", account);
        assert!(!printed.contains("deadbeef"));
        assert!(printed.contains("0x1234"));
    }
}
