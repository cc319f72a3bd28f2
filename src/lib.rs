//! cabal-radar - Shared Token Purchase Discovery Library
//!
//! Finds fungible tokens independently purchased by multiple Solana wallets
//! from their parsed transaction history.
//!
//! # Modules
//!
//! - `domain`: Core discovery logic (addresses, classifier, aggregator)
//! - `ports`: Trait abstractions (TransactionHistoryPort, MetadataPort)
//! - `adapters`: External implementations (Helius, metadata, CLI)
//! - `application`: WalletScanner and ScanOrchestrator
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;
pub mod config;
