//! Metadata Port
//!
//! Best-effort mint metadata lookup. Missing entries are allowed; the
//! scan result is complete without them.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display metadata for one mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
}

/// Metadata lookup errors
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    RequestFailed(String),

    #[error("failed to parse metadata response: {0}")]
    ParseError(String),

    #[error("rate limited by metadata source")]
    RateLimited,
}

/// Batch mint metadata resolver
#[async_trait]
pub trait MetadataPort: Send + Sync {
    /// Resolve metadata for a batch of mints. Mints the source does not
    /// know are simply absent from the returned map.
    async fn resolve(&self, mints: &[String]) -> Result<HashMap<String, TokenMeta>, MetadataError>;
}
