//! Wallet Scanner
//!
//! Drives one wallet's paginated history scan: fetch a page, classify it,
//! advance the cursor, repeat until the page budget, an empty page, or a
//! stuck cursor ends the walk. Rate-limit pressure shrinks the page size
//! instead of skipping the page, and any unrecoverable error degrades the
//! wallet to whatever was accumulated so far.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AcquisitionClassifier, AcquisitionSet, TxExample, WalletAddress};
use crate::ports::history::{HistoryError, TransactionHistoryPort};

/// Smallest page size the degrade ladder will request
pub const DEFAULT_PAGE_SIZE_FLOOR: u32 = 40;

/// Scanner pacing and degrade settings
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Fixed delay between page fetches within one wallet
    pub page_delay: Duration,
    /// Degrade ladder floor
    pub page_size_floor: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(250),
            page_size_floor: DEFAULT_PAGE_SIZE_FLOOR,
        }
    }
}

/// Page-size plan for one wallet's scan.
///
/// Rate-limit outcomes halve the size down to the floor; a request that
/// starts at or below the floor has nowhere to degrade to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    pub size: u32,
    pub floor: u32,
}

impl PagePlan {
    pub fn new(requested: u32, floor: u32) -> Self {
        Self {
            size: requested.max(1),
            floor: floor.max(1),
        }
    }

    /// Shrink the page size one step. Returns false when already at or
    /// below the floor, meaning the rate limit is terminal for this wallet.
    pub fn degrade(&mut self) -> bool {
        if self.size <= self.floor {
            return false;
        }
        self.size = (self.size / 2).max(self.floor);
        true
    }
}

/// Result of scanning one wallet. `failure` is set when the scan ended on
/// an unrecoverable error; the acquisition set still holds everything
/// classified before that point.
#[derive(Debug)]
pub struct ScanOutcome {
    pub address: WalletAddress,
    pub acquired: AcquisitionSet,
    pub pages_fetched: u32,
    pub transactions_seen: usize,
    pub failure: Option<HistoryError>,
}

impl ScanOutcome {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Sequential page-walker for one wallet at a time
pub struct WalletScanner {
    history: Arc<dyn TransactionHistoryPort>,
    classifier: AcquisitionClassifier,
    config: ScannerConfig,
}

impl WalletScanner {
    pub fn new(
        history: Arc<dyn TransactionHistoryPort>,
        classifier: AcquisitionClassifier,
        config: ScannerConfig,
    ) -> Self {
        Self {
            history,
            classifier,
            config,
        }
    }

    /// Scan one wallet's history, newest first.
    ///
    /// Never returns an error: failures are folded into the outcome so a
    /// multi-wallet run continues with the next wallet.
    pub async fn scan(
        &self,
        address: &WalletAddress,
        page_budget: u32,
        page_size: u32,
    ) -> ScanOutcome {
        let mut acquired = AcquisitionSet::new();
        let mut cursor: Option<String> = None;
        let mut plan = PagePlan::new(page_size, self.config.page_size_floor);
        let mut pages_fetched = 0u32;
        let mut transactions_seen = 0usize;

        for page_index in 0..page_budget {
            if page_index > 0 && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }

            // retry the same logical page at smaller sizes until it fits
            // under the rate limit or the ladder bottoms out
            let page = loop {
                match self
                    .history
                    .fetch_page(address, cursor.as_deref(), plan.size)
                    .await
                {
                    Ok(page) => break page,
                    Err(e) => {
                        if e == HistoryError::RateLimited && plan.degrade() {
                            tracing::warn!(
                                wallet = %address,
                                page = page_index,
                                new_size = plan.size,
                                "rate limited, retrying page at smaller size"
                            );
                            continue;
                        }
                        tracing::warn!(
                            wallet = %address,
                            page = page_index,
                            error = %e,
                            "scan aborted, keeping partial acquisition set"
                        );
                        return ScanOutcome {
                            address: address.clone(),
                            acquired,
                            pages_fetched,
                            transactions_seen,
                            failure: Some(e),
                        };
                    }
                }
            };

            pages_fetched += 1;
            if page.is_empty() {
                break;
            }
            transactions_seen += page.len();

            for tx in &page {
                for mint in self.classifier.classify(tx, address) {
                    acquired.record(
                        &mint,
                        TxExample {
                            signature: tx.signature.clone(),
                            timestamp: tx.timestamp,
                        },
                    );
                }
            }

            let next_cursor = page.last().map(|tx| tx.signature.clone());
            if next_cursor == cursor {
                tracing::debug!(wallet = %address, "cursor did not advance, stopping");
                break;
            }
            cursor = next_cursor;
        }

        tracing::info!(
            wallet = %address,
            pages = pages_fetched,
            transactions = transactions_seen,
            acquired = acquired.len(),
            "wallet scan complete"
        );

        ScanOutcome {
            address: address.clone(),
            acquired,
            pages_fetched,
            transactions_seen,
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NativeTransfer, TokenAmount, TokenTransfer, TransactionRecord, TxKind};
    use crate::ports::mocks::{ScriptedHistory, ScriptedPage};

    const WALLET: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";
    const MEME_MINT: &str = "Fh9X2kPvM1nQr7TdLbWc4jYs8uZaE3gB6tCmNxRiKoJD";

    fn wallet() -> WalletAddress {
        WalletAddress::parse(WALLET).unwrap()
    }

    fn no_delay_config() -> ScannerConfig {
        ScannerConfig {
            page_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn scanner(history: ScriptedHistory) -> WalletScanner {
        WalletScanner::new(
            Arc::new(history),
            AcquisitionClassifier::default(),
            no_delay_config(),
        )
    }

    /// A swap-style buy of `mint` with a distinct signature
    fn buy_tx(signature: &str, mint: &str) -> TransactionRecord {
        TransactionRecord {
            signature: signature.to_string(),
            timestamp: 1_700_000_000,
            kind: TxKind::Swap,
            token_transfers: vec![TokenTransfer {
                mint: mint.to_string(),
                from_account: Some("pool-ata".into()),
                from_owner: Some("pool".into()),
                to_account: Some("wallet-ata".into()),
                to_owner: Some(WALLET.into()),
                amount: TokenAmount::new(5_000_000, 6),
            }],
            native_transfers: vec![NativeTransfer {
                from_account: Some(WALLET.into()),
                to_account: Some("pool".into()),
                lamports: 1_000_000_000,
            }],
            swap: None,
            mint_events: vec![],
        }
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        // 3 non-empty pages then an empty one: exactly 4 fetches on budget 10
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig2", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig3", MEME_MINT)]),
                ScriptedPage::Ok(vec![]),
            ],
        );
        let calls = history.clone();

        let outcome = scanner(history).scan(&wallet(), 10, 100).await;

        assert_eq!(calls.call_count_for(WALLET), 4);
        assert_eq!(outcome.pages_fetched, 4);
        assert_eq!(outcome.transactions_seen, 3);
        assert!(!outcome.is_partial());
        assert!(outcome.acquired.contains(MEME_MINT));
    }

    #[tokio::test]
    async fn test_stops_at_page_budget() {
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig2", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig3", MEME_MINT)]),
            ],
        );
        let calls = history.clone();

        let outcome = scanner(history).scan(&wallet(), 2, 100).await;

        assert_eq!(calls.call_count_for(WALLET), 2);
        assert_eq!(outcome.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_cursor_advances_between_pages() {
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig2", MEME_MINT)]),
                ScriptedPage::Ok(vec![]),
            ],
        );
        let calls = history.clone();

        scanner(history).scan(&wallet(), 10, 100).await;

        let recorded = calls.calls();
        assert_eq!(recorded[0].before, None);
        assert_eq!(recorded[1].before.as_deref(), Some("sig1"));
        assert_eq!(recorded[2].before.as_deref(), Some("sig2"));
    }

    #[tokio::test]
    async fn test_stops_on_stuck_cursor() {
        // same page returned forever: stop after the cursor fails to move
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
            ],
        );
        let calls = history.clone();

        let outcome = scanner(history).scan(&wallet(), 10, 100).await;

        assert_eq!(calls.call_count_for(WALLET), 2);
        assert!(!outcome.is_partial());
    }

    #[tokio::test]
    async fn test_degrades_page_size_on_rate_limit() {
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::OkBelow {
                    max_size: 50,
                    page: vec![buy_tx("sig1", MEME_MINT)],
                },
                ScriptedPage::Ok(vec![]),
            ],
        );
        let calls = history.clone();

        let outcome = scanner(history).scan(&wallet(), 10, 100).await;

        assert!(!outcome.is_partial());
        assert!(outcome.acquired.contains(MEME_MINT));
        let recorded = calls.calls();
        // 100 was rate limited, the retry at 50 carried the same cursor
        assert_eq!(recorded[0].page_size, 100);
        assert_eq!(recorded[1].page_size, 50);
        assert_eq!(recorded[0].before, recorded[1].before);
    }

    #[tokio::test]
    async fn test_rate_limit_at_floor_is_terminal() {
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::OkBelow {
                    max_size: 10,
                    page: vec![],
                },
            ],
        );

        let outcome = scanner(history).scan(&wallet(), 10, 100).await;

        // page 1 survived, page 2 never fit under the limit
        assert!(outcome.is_partial());
        assert_eq!(outcome.failure, Some(HistoryError::RateLimited));
        assert!(outcome.acquired.contains(MEME_MINT));
    }

    #[tokio::test]
    async fn test_fatal_error_keeps_partial_set() {
        let history = ScriptedHistory::new().with_pages(
            WALLET,
            vec![
                ScriptedPage::Ok(vec![buy_tx("sig1", MEME_MINT)]),
                ScriptedPage::Fail(HistoryError::Malformed("not json".into())),
            ],
        );

        let outcome = scanner(history).scan(&wallet(), 10, 100).await;

        assert!(outcome.is_partial());
        assert!(matches!(outcome.failure, Some(HistoryError::Malformed(_))));
        assert!(outcome.acquired.contains(MEME_MINT));
        assert_eq!(outcome.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_empty_history_yields_empty_set() {
        let history = ScriptedHistory::new();
        let outcome = scanner(history).scan(&wallet(), 5, 100).await;
        assert!(outcome.acquired.is_empty());
        assert!(!outcome.is_partial());
        assert_eq!(outcome.pages_fetched, 1);
    }

    #[test]
    fn test_page_plan_degrade_ladder() {
        let mut plan = PagePlan::new(100, 40);
        assert!(plan.degrade());
        assert_eq!(plan.size, 50);
        assert!(plan.degrade());
        assert_eq!(plan.size, 40); // halving clamps to the floor
        assert!(!plan.degrade());
        assert_eq!(plan.size, 40);
    }

    #[test]
    fn test_page_plan_below_floor_cannot_degrade() {
        let mut plan = PagePlan::new(10, 40);
        assert_eq!(plan.size, 10);
        assert!(!plan.degrade());
    }
}
