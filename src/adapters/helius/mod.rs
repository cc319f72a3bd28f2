//! Helius Adapter
//!
//! Enhanced-transactions history client and the raw payload types it
//! normalizes into the canonical domain model.

pub mod client;
pub mod types;

pub use client::{HeliusClient, HeliusConfig, RetrySchedule};
pub use types::RawTransaction;
