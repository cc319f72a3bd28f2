//! Wallet Address
//!
//! Validated Solana wallet address. Validation happens once, at the request
//! boundary, so everything downstream can treat the address as well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors raised when parsing a wallet address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address '{0}' is not a valid base58 public key")]
    InvalidBase58(String),
}

/// A validated base58 Solana wallet address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and validate an address string
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        Pubkey::from_str(trimmed)
            .map_err(|_| AddressError::InvalidBase58(trimmed.to_string()))?;

        Ok(Self(trimmed.to_string()))
    }

    /// The underlying base58 string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this address matches an optional account field.
    /// Missing and empty fields never match.
    pub fn matches(&self, account: Option<&str>) -> bool {
        match account {
            Some(a) if !a.is_empty() => a == self.0,
            _ => false,
        }
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
