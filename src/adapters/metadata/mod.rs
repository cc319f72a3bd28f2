//! Metadata Adapter
//!
//! DAS-backed mint metadata resolver with TTL caching.

pub mod cache;
pub mod client;

pub use cache::MetadataCache;
pub use client::{MetadataConfig, TokenMetadataClient};
