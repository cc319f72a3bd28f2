//! Application Layer - Scan coordination
//!
//! The wallet scanner walks one wallet's history; the orchestrator runs the
//! whole multi-wallet request end to end.

pub mod orchestrator;
pub mod scanner;

pub use orchestrator::{
    ScanError, ScanOrchestrator, ScanReport, ScanRequest, SharedTokenReport, WalletSummary,
};
pub use scanner::{PagePlan, ScanOutcome, ScannerConfig, WalletScanner};
