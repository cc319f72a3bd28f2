//! Transaction History Port
//!
//! Trait boundary to the upstream transaction source, plus the error
//! taxonomy the scanner's retry and degrade decisions hinge on.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TransactionRecord, WalletAddress};

/// Upstream failure classes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Rate limited and retries already spent; caller may degrade page size
    #[error("rate limited by transaction source")]
    RateLimited,

    /// Timeout, abort, or connection reset after retries
    #[error("transient network failure: {0}")]
    Transient(String),

    /// Non-JSON body, unexpected shape, or a non-retryable status
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// Missing or rejected credentials; fatal for the whole request
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl HistoryError {
    /// True for failure classes the HTTP layer retries with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, HistoryError::RateLimited | HistoryError::Transient(_))
    }
}

/// One page of a wallet's transaction history.
///
/// Stateless: cursor and page size arrive with every call. Pages are
/// newest-first; an empty page means the history is exhausted.
#[async_trait]
pub trait TransactionHistoryPort: Send + Sync {
    async fn fetch_page(
        &self,
        address: &WalletAddress,
        before: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<TransactionRecord>, HistoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classes() {
        assert!(HistoryError::RateLimited.is_retryable());
        assert!(HistoryError::Transient("reset".into()).is_retryable());
        assert!(!HistoryError::Malformed("not json".into()).is_retryable());
        assert!(!HistoryError::Unauthorized("no key".into()).is_retryable());
    }
}
