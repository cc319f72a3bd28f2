//! Scan Orchestrator
//!
//! Coordinates the multi-wallet run: validates the request before any
//! network call, scans wallets strictly sequentially (the upstream source
//! is one shared rate-limited resource), aggregates the shared tokens, and
//! optionally enriches them with display metadata.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::{
    aggregate, AcquisitionClassifier, AggregationMode, TxExample, WalletAddress,
};
use crate::ports::history::{HistoryError, TransactionHistoryPort};
use crate::ports::metadata::{MetadataPort, TokenMeta};

use super::scanner::{ScannerConfig, WalletScanner};

/// Bounds on a scan request
pub const MIN_ADDRESSES: usize = 2;
pub const MAX_ADDRESSES: usize = 10;
pub const MAX_PAGES: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// A multi-wallet scan request, validated on entry
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub addresses: Vec<String>,
    /// Page budget per wallet
    pub pages: u32,
    /// Requested page size before any degrade
    pub page_size: u32,
    pub mode: AggregationMode,
}

/// Errors fatal to the whole request
#[derive(Debug, Error)]
pub enum ScanError {
    /// Rejected before any network call
    #[error("invalid request: {0}")]
    Validation(String),

    /// Upstream is unusable for every wallet (e.g. rejected credentials)
    #[error("transaction source unavailable: {0}")]
    Unavailable(String),
}

/// One example transaction in the report
#[derive(Debug, Clone, Serialize)]
pub struct ExampleReport {
    pub signature: String,
    pub timestamp: i64,
    /// `timestamp` as UTC, for human-facing output
    pub time: Option<DateTime<Utc>>,
}

impl From<&TxExample> for ExampleReport {
    fn from(example: &TxExample) -> Self {
        Self {
            signature: example.signature.clone(),
            timestamp: example.timestamp,
            time: DateTime::from_timestamp(example.timestamp, 0),
        }
    }
}

/// One shared token in the report
#[derive(Debug, Clone, Serialize)]
pub struct SharedTokenReport {
    pub mint: String,
    pub count: usize,
    pub wallets: Vec<String>,
    pub examples: Vec<ExampleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<TokenMeta>,
}

/// Per-wallet outcome summary
#[derive(Debug, Clone, Serialize)]
pub struct WalletSummary {
    pub address: String,
    pub pages_fetched: u32,
    pub transactions_seen: usize,
    pub acquired_mints: usize,
    /// Set when the wallet's scan ended early; its partial set still counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Final result of a multi-wallet scan.
///
/// An empty `list` is a valid outcome ("found nothing"), distinct from the
/// `ScanError` a rejected request produces.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub found: usize,
    pub list: Vec<SharedTokenReport>,
    pub wallets: Vec<WalletSummary>,
}

/// Multi-wallet scan coordinator
pub struct ScanOrchestrator {
    history: Arc<dyn TransactionHistoryPort>,
    metadata: Option<Arc<dyn MetadataPort>>,
    classifier: AcquisitionClassifier,
    scanner_config: ScannerConfig,
    is_running: Arc<RwLock<bool>>,
}

impl ScanOrchestrator {
    pub fn new(
        history: Arc<dyn TransactionHistoryPort>,
        metadata: Option<Arc<dyn MetadataPort>>,
        classifier: AcquisitionClassifier,
        scanner_config: ScannerConfig,
    ) -> Self {
        Self {
            history,
            metadata,
            classifier,
            scanner_config,
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Request the run be abandoned. Takes effect between wallets; a wallet
    /// mid-scan finishes its current fetch-and-classify step first.
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Validate, scan every wallet sequentially, aggregate, enrich.
    pub async fn run(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let addresses = Self::validate(request)?;

        *self.is_running.write().await = true;

        let scanner = WalletScanner::new(
            Arc::clone(&self.history),
            self.classifier.clone(),
            self.scanner_config.clone(),
        );

        let mut wallet_sets = BTreeMap::new();
        let mut summaries = Vec::new();

        for address in &addresses {
            if !*self.is_running.read().await {
                tracing::info!(
                    "scan cancelled, {} wallet(s) not scanned",
                    addresses.len() - summaries.len()
                );
                break;
            }

            let outcome = scanner
                .scan(address, request.pages, request.page_size)
                .await;

            // rejected credentials will fail every wallet the same way
            if let Some(HistoryError::Unauthorized(reason)) = &outcome.failure {
                return Err(ScanError::Unavailable(reason.clone()));
            }

            summaries.push(WalletSummary {
                address: address.as_str().to_string(),
                pages_fetched: outcome.pages_fetched,
                transactions_seen: outcome.transactions_seen,
                acquired_mints: outcome.acquired.len(),
                failure: outcome.failure.as_ref().map(|e| e.to_string()),
            });
            wallet_sets.insert(address.clone(), outcome.acquired);
        }

        let shared = aggregate(&wallet_sets, request.mode);

        let meta_by_mint = self.enrich(&shared).await;

        let list: Vec<SharedTokenReport> = shared
            .iter()
            .map(|token| SharedTokenReport {
                mint: token.mint.clone(),
                count: token.count,
                wallets: token
                    .wallets
                    .iter()
                    .map(|w| w.as_str().to_string())
                    .collect(),
                examples: token.examples.iter().map(ExampleReport::from).collect(),
                meta: meta_by_mint.get(&token.mint).cloned(),
            })
            .collect();

        tracing::info!(
            wallets = summaries.len(),
            shared = list.len(),
            "multi-wallet scan finished"
        );

        Ok(ScanReport {
            found: list.len(),
            list,
            wallets: summaries,
        })
    }

    /// Best-effort metadata pass; failures only cost the labels
    async fn enrich(&self, shared: &[crate::domain::SharedToken]) -> BTreeMap<String, TokenMeta> {
        let Some(metadata) = &self.metadata else {
            return BTreeMap::new();
        };
        if shared.is_empty() {
            return BTreeMap::new();
        }

        let mints: Vec<String> = shared.iter().map(|t| t.mint.clone()).collect();
        match metadata.resolve(&mints).await {
            Ok(resolved) => resolved.into_iter().collect(),
            Err(e) => {
                tracing::warn!("metadata enrichment failed, continuing without: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Reject bad requests before any network call
    fn validate(request: &ScanRequest) -> Result<Vec<WalletAddress>, ScanError> {
        if request.addresses.len() < MIN_ADDRESSES || request.addresses.len() > MAX_ADDRESSES {
            return Err(ScanError::Validation(format!(
                "expected {}-{} addresses, got {}",
                MIN_ADDRESSES,
                MAX_ADDRESSES,
                request.addresses.len()
            )));
        }

        let mut addresses = Vec::with_capacity(request.addresses.len());
        for raw in &request.addresses {
            let address =
                WalletAddress::parse(raw).map_err(|e| ScanError::Validation(e.to_string()))?;
            if addresses.contains(&address) {
                return Err(ScanError::Validation(format!(
                    "duplicate address: {}",
                    address
                )));
            }
            addresses.push(address);
        }

        if request.pages == 0 || request.pages > MAX_PAGES {
            return Err(ScanError::Validation(format!(
                "pages must be 1-{}, got {}",
                MAX_PAGES, request.pages
            )));
        }

        if request.page_size == 0 || request.page_size > MAX_PAGE_SIZE {
            return Err(ScanError::Validation(format!(
                "page size must be 1-{}, got {}",
                MAX_PAGE_SIZE, request.page_size
            )));
        }

        if let AggregationMode::Threshold { min_wallets } = request.mode {
            if min_wallets < 2 {
                return Err(ScanError::Validation(format!(
                    "minimum shared-wallet count must be at least 2, got {}",
                    min_wallets
                )));
            }
        }

        Ok(addresses)
    }
}
