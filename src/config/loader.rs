//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/default.toml.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::helius::HeliusConfig;
use crate::adapters::metadata::MetadataConfig;
use crate::application::ScannerConfig;
use crate::domain::classifier::{ClassifierConfig, DEFAULT_MIN_DISPLAY_AMOUNT};
use crate::domain::AggregationMode;

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scanner: ScannerSection,
    pub source: SourceSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub metadata: MetadataSection,
    pub logging: LoggingSection,
}

/// Scanner configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSection {
    /// Page budget per wallet (1-10)
    pub pages: u32,
    /// Requested history page size before any degrade (1-1000)
    pub page_size: u32,
    /// Smallest page size the degrade ladder requests
    pub page_size_floor: u32,
    /// Pacing delay between page fetches, milliseconds
    pub page_delay_ms: u64,
    /// Overlap mode: "threshold" or "strict"
    pub mode: String,
    /// Minimum distinct wallets for threshold mode
    pub min_wallets: usize,
}

/// Transaction source configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Enhanced-transactions API base URL
    pub api_base_url: String,
    /// API key; prefer the HELIUS_API_KEY env var over committing this
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retry attempts for rate-limit and transient failures
    pub max_retries: u32,
    /// Base delay for quadratic backoff (milliseconds)
    pub backoff_base_ms: u64,
}

impl SourceSection {
    /// Get API key with environment variable override.
    /// Checks HELIUS_API_KEY env var first, falls back to config value.
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("HELIUS_API_KEY") {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone().filter(|k| !k.is_empty())
    }
}

/// Classifier configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSection {
    /// Materiality floor in display units
    pub min_display_amount: f64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            min_display_amount: 0.0005,
        }
    }
}

impl ClassifierSection {
    /// The floor as an exact decimal; non-finite values fall back to the default
    pub fn floor(&self) -> Decimal {
        Decimal::from_f64(self.min_display_amount).unwrap_or(DEFAULT_MIN_DISPLAY_AMOUNT)
    }
}

/// Metadata enrichment configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataSection {
    /// Enrich shared tokens with name/symbol/image
    pub enabled: bool,
    /// DAS JSON-RPC endpoint
    pub rpc_url: String,
    /// Cache entry lifetime in seconds
    pub cache_ttl_secs: u64,
    /// Mints per batch request
    pub batch_size: usize,
    /// Concurrent batch requests in flight
    pub max_concurrency: usize,
}

impl Default for MetadataSection {
    fn default() -> Self {
        Self {
            enabled: true,
            rpc_url: "https://mainnet.helius-rpc.com".to_string(),
            cache_ttl_secs: 600,
            batch_size: 100,
            max_concurrency: 4,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.pages == 0 || self.scanner.pages > 10 {
            return Err(ConfigError::ValidationError(format!(
                "pages must be 1-10, got {}",
                self.scanner.pages
            )));
        }

        if self.scanner.page_size == 0 || self.scanner.page_size > 1000 {
            return Err(ConfigError::ValidationError(format!(
                "page_size must be 1-1000, got {}",
                self.scanner.page_size
            )));
        }

        if self.scanner.page_size_floor == 0 {
            return Err(ConfigError::ValidationError(
                "page_size_floor must be > 0".to_string(),
            ));
        }

        if self.scanner.mode != "threshold" && self.scanner.mode != "strict" {
            return Err(ConfigError::ValidationError(format!(
                "mode must be \"threshold\" or \"strict\", got \"{}\"",
                self.scanner.mode
            )));
        }

        if self.scanner.min_wallets < 2 {
            return Err(ConfigError::ValidationError(format!(
                "min_wallets must be >= 2, got {}",
                self.scanner.min_wallets
            )));
        }

        if self.source.api_base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_base_url cannot be empty".to_string(),
            ));
        }

        if self.classifier.min_display_amount < 0.0
            || !self.classifier.min_display_amount.is_finite()
        {
            return Err(ConfigError::ValidationError(format!(
                "min_display_amount must be a finite non-negative number, got {}",
                self.classifier.min_display_amount
            )));
        }

        if self.metadata.enabled && self.metadata.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata rpc_url cannot be empty".to_string(),
            ));
        }

        if self.logging.level.is_empty() {
            return Err(ConfigError::ValidationError(
                "logging level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured overlap mode
    pub fn aggregation_mode(&self) -> AggregationMode {
        if self.scanner.mode == "strict" {
            AggregationMode::StrictIntersection
        } else {
            AggregationMode::Threshold {
                min_wallets: self.scanner.min_wallets,
            }
        }
    }
}

impl From<&Config> for ScannerConfig {
    fn from(config: &Config) -> Self {
        ScannerConfig {
            page_delay: Duration::from_millis(config.scanner.page_delay_ms),
            page_size_floor: config.scanner.page_size_floor,
        }
    }
}

impl From<&Config> for ClassifierConfig {
    fn from(config: &Config) -> Self {
        ClassifierConfig {
            min_display_amount: config.classifier.floor(),
        }
    }
}

impl Config {
    /// Build the history client config; the key must already be resolved
    pub fn helius_config(&self, api_key: String) -> HeliusConfig {
        HeliusConfig {
            api_base_url: self.source.api_base_url.clone(),
            api_key,
            timeout: Duration::from_secs(self.source.timeout_secs),
            max_retries: self.source.max_retries,
            backoff_base_ms: self.source.backoff_base_ms,
        }
    }

    /// Build the metadata client config; the key must already be resolved
    pub fn metadata_config(&self, api_key: String) -> MetadataConfig {
        MetadataConfig {
            rpc_url: self.metadata.rpc_url.clone(),
            api_key,
            max_retries: self.source.max_retries,
            backoff_base_ms: self.source.backoff_base_ms,
            batch_size: self.metadata.batch_size,
            max_concurrency: self.metadata.max_concurrency,
            cache_ttl: Duration::from_secs(self.metadata.cache_ttl_secs),
            ..Default::default()
        }
    }
}
