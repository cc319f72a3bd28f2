//! Helius History Client
//!
//! HTTP client for the enhanced-transactions API. One call carries its own
//! timeout; rate-limit and transient failures are retried with quadratic
//! backoff before the error class is surfaced to the scanner, which then
//! decides whether to degrade the page size.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::{TransactionRecord, WalletAddress};
use crate::ports::history::{HistoryError, TransactionHistoryPort};

use super::types::RawTransaction;

/// Helius API client configuration
#[derive(Debug, Clone)]
pub struct HeliusConfig {
    /// Base URL for the enhanced-transactions API
    pub api_base_url: String,
    /// API key appended to every request
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry attempts for rate-limit and transient failures
    pub max_retries: u32,
    /// Base delay for quadratic backoff (milliseconds)
    pub backoff_base_ms: u64,
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.helius.xyz".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(20),
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Retry bookkeeping for one logical call.
///
/// Delay grows quadratically: `base * attempt²` for attempt 1, 2, 3...
/// Exhaustion is explicit, not a decremented counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    pub attempt: u32,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetrySchedule {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            base_delay,
        }
    }

    /// Register a failed attempt. Returns the delay to sleep before the
    /// next try, or None once attempts are exhausted.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.base_delay * self.attempt * self.attempt)
    }

    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// Client for the enhanced-transactions history endpoint
#[derive(Debug, Clone)]
pub struct HeliusClient {
    config: HeliusConfig,
    http: Client,
}

impl HeliusClient {
    /// Create a client with custom configuration
    pub fn with_config(config: HeliusConfig) -> Result<Self, HistoryError> {
        if config.api_key.is_empty() {
            return Err(HistoryError::Unauthorized(
                "no API key configured (set HELIUS_API_KEY)".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HistoryError::Transient(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Create a client with the default endpoint and the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, HistoryError> {
        Self::with_config(HeliusConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn history_url(&self, address: &WalletAddress) -> String {
        format!(
            "{}/v0/addresses/{}/transactions",
            self.config.api_base_url,
            address.as_str()
        )
    }

    /// Issue one GET with retry on rate-limit and transient failures
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<reqwest::Response, HistoryError> {
        let mut schedule = RetrySchedule::new(
            self.config.max_retries,
            Duration::from_millis(self.config.backoff_base_ms),
        );

        loop {
            let result = self.http.get(url).query(query).send().await;

            let failure = match result {
                Ok(response) => {
                    let status = response.status();
                    match Self::classify_status(status) {
                        StatusClass::Ok => return Ok(response),
                        StatusClass::RateLimited => HistoryError::RateLimited,
                        StatusClass::Unauthorized => {
                            return Err(HistoryError::Unauthorized(format!(
                                "upstream rejected credentials ({})",
                                status
                            )))
                        }
                        StatusClass::Fatal => {
                            return Err(HistoryError::Malformed(format!(
                                "upstream error {}",
                                status
                            )))
                        }
                    }
                }
                // timeouts, aborts and resets are one transient class
                Err(e) => HistoryError::Transient(e.to_string()),
            };

            match schedule.next_backoff() {
                Some(delay) => {
                    tracing::warn!(
                        "history fetch failed ({}), backing off {:?} (attempt {}/{})",
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

    fn classify_status(status: StatusCode) -> StatusClass {
        if status.is_success() {
            return StatusClass::Ok;
        }
        match status {
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => StatusClass::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusClass::Unauthorized,
            _ => StatusClass::Fatal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Ok,
    RateLimited,
    Unauthorized,
    Fatal,
}

#[async_trait]
impl TransactionHistoryPort for HeliusClient {
    async fn fetch_page(
        &self,
        address: &WalletAddress,
        before: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<TransactionRecord>, HistoryError> {
        let url = self.history_url(address);

        let mut query = vec![
            ("api-key".to_string(), self.config.api_key.clone()),
            ("limit".to_string(), page_size.clamp(1, 1000).to_string()),
        ];
        if let Some(cursor) = before {
            query.push(("before".to_string(), cursor.to_string()));
        }

        let response = self.get_with_retry(&url, &query).await?;

        let raw: Vec<RawTransaction> = response
            .json()
            .await
            .map_err(|e| HistoryError::Malformed(format!("failed to parse page: {}", e)))?;

        Ok(raw.into_iter().map(RawTransaction::normalize).collect())
    }
}
