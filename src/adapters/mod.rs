//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Helius: enhanced-transactions history client and payload normalization
//! - Metadata: DAS metadata resolver with TTL caching
//! - CLI: command-line interface definitions

pub mod cli;
pub mod helius;
pub mod metadata;

pub use cli::CliApp;
pub use helius::{HeliusClient, HeliusConfig};
pub use metadata::{MetadataCache, TokenMetadataClient};
