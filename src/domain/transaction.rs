//! Canonical Transaction Model
//!
//! The normalized shape every upstream payload is mapped into before
//! classification. The classifier never sees source-specific field names;
//! the adapter owns that translation.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token quantity in base units plus its mint's decimal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Raw amount in base units
    pub raw: u128,
    /// Decimal places of the mint
    pub decimals: u32,
}

impl TokenAmount {
    pub fn new(raw: u128, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    /// Amount in display units (raw / 10^decimals), exact
    pub fn display(&self) -> Decimal {
        // raw amounts past Decimal's 96-bit mantissa and scales past its
        // 28-digit range collapse to zero display value
        let Some(mut value) = Decimal::from_u128(self.raw) else {
            return Decimal::ZERO;
        };
        if value.set_scale(self.decimals).is_err() {
            return Decimal::ZERO;
        }
        value
    }
}

/// One SPL token movement inside a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub mint: String,
    pub from_account: Option<String>,
    pub from_owner: Option<String>,
    pub to_account: Option<String>,
    pub to_owner: Option<String>,
    pub amount: TokenAmount,
}

impl TokenTransfer {
    /// True when the transfer lands on the given owner or token account
    pub fn lands_on(&self, address: &crate::domain::WalletAddress) -> bool {
        address.matches(self.to_owner.as_deref()) || address.matches(self.to_account.as_deref())
    }

    /// True when the transfer leaves the given owner or token account
    pub fn leaves(&self, address: &crate::domain::WalletAddress) -> bool {
        address.matches(self.from_owner.as_deref()) || address.matches(self.from_account.as_deref())
    }
}

/// One native SOL movement inside a transaction (lamports)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeTransfer {
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub lamports: u64,
}

/// DEX trade summary attached by the indexing source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapEvent {
    /// The account the source attributes the swap to
    pub user: Option<String>,
}

/// Token creation straight to a recipient (bonding-curve first buys)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintEvent {
    pub mint: String,
    pub to_account: Option<String>,
    pub to_owner: Option<String>,
    /// Minted amount when the source reports one
    pub amount: Option<TokenAmount>,
}

impl MintEvent {
    /// True when the minted tokens land on the given owner or token account
    pub fn lands_on(&self, address: &crate::domain::WalletAddress) -> bool {
        address.matches(self.to_owner.as_deref()) || address.matches(self.to_account.as_deref())
    }
}

/// Source-assigned transaction category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Swap,
    TokenMint,
    Transfer,
    Other(String),
    Untagged,
}

impl TxKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("SWAP") => TxKind::Swap,
            Some("TOKEN_MINT") => TxKind::TokenMint,
            Some("TRANSFER") => TxKind::Transfer,
            Some(other) => TxKind::Other(other.to_string()),
            None => TxKind::Untagged,
        }
    }
}

/// One historical transaction, normalized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    /// Unix seconds
    pub timestamp: i64,
    pub kind: TxKind,
    pub token_transfers: Vec<TokenTransfer>,
    pub native_transfers: Vec<NativeTransfer>,
    pub swap: Option<SwapEvent>,
    pub mint_events: Vec<MintEvent>,
}

impl TransactionRecord {
    /// Net lamport outflow from the address: outgoing minus incoming,
    /// clamped at zero
    pub fn native_outflow(&self, address: &crate::domain::WalletAddress) -> u64 {
        let mut net: i128 = 0;
        for transfer in &self.native_transfers {
            if address.matches(transfer.from_account.as_deref()) {
                net += i128::from(transfer.lamports);
            }
            if address.matches(transfer.to_account.as_deref()) {
                net -= i128::from(transfer.lamports);
            }
        }
        if net > 0 {
            net.min(i128::from(u64::MAX)) as u64
        } else {
            0
        }
    }
}
