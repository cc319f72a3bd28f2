//! Token Metadata Client
//!
//! Resolves mint metadata in batches over the DAS `getAssetBatch` JSON-RPC
//! method. Lookups are best-effort: unknown mints are simply absent from the
//! result, and resolved entries land in an injected TTL cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::adapters::helius::RetrySchedule;
use crate::ports::metadata::{MetadataError, MetadataPort, TokenMeta};

use super::cache::MetadataCache;

/// Metadata resolver configuration
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// DAS JSON-RPC endpoint
    pub rpc_url: String,
    /// API key appended to the endpoint
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry attempts for rate-limit and transient failures
    pub max_retries: u32,
    /// Base delay for quadratic backoff (milliseconds)
    pub backoff_base_ms: u64,
    /// Mints per getAssetBatch call
    pub batch_size: usize,
    /// Concurrent batch requests in flight
    pub max_concurrency: usize,
    /// Cache entry lifetime
    pub cache_ttl: Duration,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.helius-rpc.com".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
            backoff_base_ms: 400,
            batch_size: 100,
            max_concurrency: 4,
            cache_ttl: MetadataCache::DEFAULT_TTL,
        }
    }
}

/// DAS metadata client with TTL caching
#[derive(Debug)]
pub struct TokenMetadataClient {
    config: MetadataConfig,
    http: Client,
    // scoped locks only, never held across an await
    cache: Mutex<MetadataCache>,
}

impl TokenMetadataClient {
    pub fn with_config(config: MetadataConfig) -> Result<Self, MetadataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MetadataError::RequestFailed(format!("failed to create HTTP client: {}", e)))?;

        let cache = Mutex::new(MetadataCache::with_config(
            config.cache_ttl,
            MetadataCache::DEFAULT_MAX_ENTRIES,
        ));

        Ok(Self {
            config,
            http,
            cache,
        })
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, MetadataError> {
        Self::with_config(MetadataConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    fn rpc_url(&self) -> String {
        format!("{}/?api-key={}", self.config.rpc_url, self.config.api_key)
    }

    /// Fetch one batch of mints, retrying rate-limit and transient failures
    async fn resolve_chunk(
        &self,
        mints: &[String],
    ) -> Result<HashMap<String, TokenMeta>, MetadataError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getAssetBatch",
            "params": { "ids": mints }
        });

        let mut schedule = RetrySchedule::new(
            self.config.max_retries,
            Duration::from_millis(self.config.backoff_base_ms),
        );

        loop {
            let result = self
                .http
                .post(self.rpc_url())
                .json(&request_body)
                .send()
                .await;

            let failure = match result {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        MetadataError::RateLimited
                    } else if !status.is_success() {
                        return Err(MetadataError::RequestFailed(format!(
                            "metadata endpoint returned {}",
                            status
                        )));
                    } else {
                        let body: RpcResponse = response.json().await.map_err(|e| {
                            MetadataError::ParseError(format!("failed to parse assets: {}", e))
                        })?;
                        return Ok(Self::collect_assets(body));
                    }
                }
                Err(e) => MetadataError::RequestFailed(e.to_string()),
            };

            match schedule.next_backoff() {
                Some(delay) => {
                    tracing::warn!(
                        "metadata batch failed ({}), backing off {:?} (attempt {}/{})",
                        failure,
                        delay,
                        schedule.attempt,
                        schedule.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(failure),
            }
        }
    }

    fn collect_assets(body: RpcResponse) -> HashMap<String, TokenMeta> {
        let mut resolved = HashMap::new();
        for asset in body.result.unwrap_or_default().into_iter().flatten() {
            let content = asset.content.unwrap_or_default();
            let metadata = content.metadata.unwrap_or_default();
            let meta = TokenMeta {
                name: metadata.name.filter(|s| !s.is_empty()),
                symbol: metadata.symbol.filter(|s| !s.is_empty()),
                image: content.links.and_then(|l| l.image).filter(|s| !s.is_empty()),
            };
            // an asset with no displayable fields is as good as absent
            if meta.name.is_some() || meta.symbol.is_some() || meta.image.is_some() {
                resolved.insert(asset.id, meta);
            }
        }
        resolved
    }
}

#[async_trait]
impl MetadataPort for TokenMetadataClient {
    async fn resolve(&self, mints: &[String]) -> Result<HashMap<String, TokenMeta>, MetadataError> {
        let mut resolved = HashMap::new();

        let misses: Vec<String> = {
            let cache = self.cache.lock().unwrap();
            mints
                .iter()
                .filter(|mint| {
                    if let Some(meta) = cache.get(mint) {
                        resolved.insert((*mint).clone(), meta.clone());
                        false
                    } else {
                        true
                    }
                })
                .cloned()
                .collect()
        };

        if misses.is_empty() {
            return Ok(resolved);
        }

        let chunks: Vec<Vec<String>> = misses
            .chunks(self.config.batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let fetched: Vec<Result<HashMap<String, TokenMeta>, MetadataError>> = stream::iter(chunks)
            .map(|chunk| async move { self.resolve_chunk(&chunk).await })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut cache = self.cache.lock().unwrap();
        for outcome in fetched {
            let batch = outcome?;
            for (mint, meta) in batch {
                cache.insert(mint.clone(), meta.clone());
                resolved.insert(mint, meta);
            }
        }

        Ok(resolved)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<Option<RawAsset>>>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    id: String,
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    #[serde(default)]
    metadata: Option<RawAssetMetadata>,
    #[serde(default)]
    links: Option<RawAssetLinks>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAssetMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAssetLinks {
    #[serde(default)]
    image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MetadataConfig::default();
        assert_eq!(config.rpc_url, "https://mainnet.helius-rpc.com");
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_collect_assets() {
        let body: RpcResponse = serde_json::from_str(
            r#"{
                "jsonrpc": "2.0",
                "id": 1,
                "result": [
                    {
                        "id": "MintX",
                        "content": {
                            "metadata": {"name": "Token X", "symbol": "TKX"},
                            "links": {"image": "https://img.example/x.png"}
                        }
                    },
                    null,
                    {"id": "MintEmpty", "content": {"metadata": {"name": "", "symbol": ""}}}
                ]
            }"#,
        )
        .unwrap();

        let resolved = TokenMetadataClient::collect_assets(body);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["MintX"].name.as_deref(), Some("Token X"));
        assert_eq!(resolved["MintX"].symbol.as_deref(), Some("TKX"));
        assert!(!resolved.contains_key("MintEmpty"));
    }

    #[test]
    fn test_collect_assets_empty_result() {
        let body: RpcResponse = serde_json::from_str(r#"{"jsonrpc": "2.0", "id": 1}"#).unwrap();
        assert!(TokenMetadataClient::collect_assets(body).is_empty());
    }

    #[test]
    fn test_rpc_url_carries_key() {
        let client = TokenMetadataClient::with_api_key("secret").unwrap();
        assert_eq!(
            client.rpc_url(),
            "https://mainnet.helius-rpc.com/?api-key=secret"
        );
    }
}
