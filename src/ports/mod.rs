//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Transaction history pages (the rate-limited upstream source)
//! - Mint metadata lookups (best-effort enrichment)

pub mod history;
pub mod metadata;
pub mod mocks;

pub use history::{HistoryError, TransactionHistoryPort};
pub use metadata::{MetadataError, MetadataPort, TokenMeta};
