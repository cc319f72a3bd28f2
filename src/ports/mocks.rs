//! Scripted port implementations for tests
//!
//! No-network stand-ins that record every call and replay a configured
//! script, so scanner and orchestrator behavior can be pinned down
//! deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{TransactionRecord, WalletAddress};
use crate::ports::history::{HistoryError, TransactionHistoryPort};
use crate::ports::metadata::{MetadataError, MetadataPort, TokenMeta};

/// One scripted page outcome
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    /// Return this page
    Ok(Vec<TransactionRecord>),
    /// Fail with this error and consume the entry
    Fail(HistoryError),
    /// Rate-limit any request larger than `max_size`; serve the page once
    /// the caller degrades to `max_size` or below
    OkBelow {
        max_size: u32,
        page: Vec<TransactionRecord>,
    },
}

/// A recorded fetch_page call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub address: String,
    pub before: Option<String>,
    pub page_size: u32,
}

/// History port that replays a per-address script.
///
/// When an address's script runs out, further fetches return empty pages,
/// matching an exhausted history upstream.
#[derive(Debug, Default, Clone)]
pub struct ScriptedHistory {
    scripts: Arc<Mutex<HashMap<String, Vec<ScriptedPage>>>>,
    calls: Arc<Mutex<Vec<RecordedFetch>>>,
}

impl ScriptedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to queue page outcomes for an address
    pub fn with_pages(self, address: &str, pages: Vec<ScriptedPage>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(address.to_string(), pages);
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of fetches recorded for one address
    pub fn call_count_for(&self, address: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.address == address)
            .count()
    }
}

#[async_trait]
impl TransactionHistoryPort for ScriptedHistory {
    async fn fetch_page(
        &self,
        address: &WalletAddress,
        before: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<TransactionRecord>, HistoryError> {
        self.calls.lock().unwrap().push(RecordedFetch {
            address: address.as_str().to_string(),
            before: before.map(str::to_string),
            page_size,
        });

        let mut scripts = self.scripts.lock().unwrap();
        let Some(queue) = scripts.get_mut(address.as_str()) else {
            return Ok(vec![]);
        };
        if queue.is_empty() {
            return Ok(vec![]);
        }

        match queue.first().cloned().unwrap() {
            ScriptedPage::Ok(page) => {
                queue.remove(0);
                Ok(page)
            }
            ScriptedPage::Fail(err) => {
                queue.remove(0);
                Err(err)
            }
            ScriptedPage::OkBelow { max_size, page } => {
                if page_size > max_size {
                    // entry stays queued so the degraded retry can consume it
                    Err(HistoryError::RateLimited)
                } else {
                    queue.remove(0);
                    Ok(page)
                }
            }
        }
    }
}

/// Metadata port backed by a fixed map
#[derive(Debug, Default, Clone)]
pub struct StaticMetadata {
    entries: Arc<Mutex<HashMap<String, TokenMeta>>>,
    fail: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a known mint
    pub fn with_meta(self, mint: &str, name: &str, symbol: &str) -> Self {
        self.entries.lock().unwrap().insert(
            mint.to_string(),
            TokenMeta {
                name: Some(name.to_string()),
                symbol: Some(symbol.to_string()),
                image: None,
            },
        );
        self
    }

    /// Builder method to make every resolve call fail
    pub fn with_failure(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    /// All recorded resolve batches
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataPort for StaticMetadata {
    async fn resolve(&self, mints: &[String]) -> Result<HashMap<String, TokenMeta>, MetadataError> {
        self.calls.lock().unwrap().push(mints.to_vec());

        if *self.fail.lock().unwrap() {
            return Err(MetadataError::RequestFailed("scripted failure".into()));
        }

        let entries = self.entries.lock().unwrap();
        Ok(mints
            .iter()
            .filter_map(|m| entries.get(m).map(|meta| (m.clone(), meta.clone())))
            .collect())
    }
}
