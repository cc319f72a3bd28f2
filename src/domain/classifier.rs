//! Acquisition Classifier
//!
//! Decides which mints a wallet acquired in a single transaction. Pure and
//! total: malformed or missing fields degrade to "no match", never an error,
//! and the same `(tx, wallet)` pair always yields the same set.
//!
//! A mint counts as acquired when the balance increase is paired with the
//! wallet giving up value in the same transaction, which separates purchases
//! from airdrops and internal shuffles.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::address::WalletAddress;
use super::excluded_mints::is_excluded;
use super::transaction::{TransactionRecord, TxKind};

/// Default materiality floor in display units; incoming transfers at or
/// below this are ignored as dust
pub const DEFAULT_MIN_DISPLAY_AMOUNT: Decimal = dec!(0.0005);

/// Classifier tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum display-unit amount for an incoming transfer to count
    pub min_display_amount: Decimal,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_display_amount: DEFAULT_MIN_DISPLAY_AMOUNT,
        }
    }
}

/// Heuristic purchase classifier
#[derive(Debug, Clone, Default)]
pub struct AcquisitionClassifier {
    config: ClassifierConfig,
}

impl AcquisitionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify one transaction for one wallet, returning the acquired mints.
    ///
    /// Rules, each contributing independently to the union:
    /// 1. Swap path: the wallet is the swap user or otherwise paid, and a
    ///    material, non-excluded transfer lands on it.
    /// 2. Direct-mint path: the wallet paid and tokens were minted straight
    ///    to it (first buys on bonding curves mint instead of transferring).
    /// 3. Loose fallback: rules 1-2 found nothing but the source tagged the
    ///    transaction as a swap and a material transfer landed on the wallet
    ///    from elsewhere.
    pub fn classify(&self, tx: &TransactionRecord, wallet: &WalletAddress) -> BTreeSet<String> {
        let mut acquired = BTreeSet::new();

        // "paid": swap-user match, net native outflow, or stable/major outflow
        let paid = self.is_swap_user(tx, wallet) || self.paid_without_swap(tx, wallet);

        // Rule 1: swap path
        if paid {
            for transfer in &tx.token_transfers {
                if transfer.lands_on(wallet)
                    && !is_excluded(&transfer.mint)
                    && transfer.amount.display() > self.config.min_display_amount
                {
                    acquired.insert(transfer.mint.clone());
                }
            }
        }

        // Rule 2: direct-mint path
        if paid {
            for event in &tx.mint_events {
                if !event.lands_on(wallet) || is_excluded(&event.mint) {
                    continue;
                }
                // an amountless mint event is accepted on the paid signal
                // alone; a reported dust amount is not
                let material = match event.amount {
                    Some(amount) => amount.display() > self.config.min_display_amount,
                    None => true,
                };
                if material {
                    acquired.insert(event.mint.clone());
                }
            }
        }

        // Rule 3: loose fallback, only when nothing matched and the source
        // itself tagged this as a swap
        if acquired.is_empty() && tx.kind == TxKind::Swap {
            for transfer in &tx.token_transfers {
                if transfer.lands_on(wallet)
                    && !transfer.leaves(wallet)
                    && !is_excluded(&transfer.mint)
                    && transfer.amount.display() > self.config.min_display_amount
                {
                    acquired.insert(transfer.mint.clone());
                }
            }
        }

        acquired
    }

    /// The source attributed the swap to this wallet
    fn is_swap_user(&self, tx: &TransactionRecord, wallet: &WalletAddress) -> bool {
        tx.swap
            .as_ref()
            .map(|swap| wallet.matches(swap.user.as_deref()))
            .unwrap_or(false)
    }

    /// The wallet gave up value: net native outflow, or an outflow of a
    /// recognized stable/major mint
    fn paid_without_swap(&self, tx: &TransactionRecord, wallet: &WalletAddress) -> bool {
        if tx.native_outflow(wallet) > 0 {
            return true;
        }
        tx.token_transfers
            .iter()
            .any(|t| is_excluded(&t.mint) && t.leaves(wallet))
    }
}
