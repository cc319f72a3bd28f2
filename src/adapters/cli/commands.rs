//! CLI Command Handlers
//!
//! Argument definitions for the cabal-radar CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cabal-radar - Shared Token Purchase Discovery for Solana Wallets
#[derive(Parser, Debug)]
#[command(
    name = "cabal-radar",
    version = env!("CARGO_PKG_VERSION"),
    about = "Shared token purchase discovery across Solana wallets",
    long_about = "cabal-radar walks the transaction history of a group of wallets, \
                  classifies which tokens each wallet actually bought, and reports \
                  the mints shared across the group."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a group of wallets for shared token purchases
    Scan(ScanCmd),

    /// Resolve display metadata for mint addresses
    Resolve(ResolveCmd),
}

/// Scan wallets for shared purchases
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Wallet addresses to scan (2-10)
    #[arg(value_name = "ADDRESS", num_args = 2..=10, required = true)]
    pub addresses: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Override the per-wallet page budget (1-10)
    #[arg(long, value_name = "N")]
    pub pages: Option<u32>,

    /// Override the requested page size (1-1000)
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Override the overlap mode (threshold, strict)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Override the minimum shared-wallet count for threshold mode
    #[arg(long, value_name = "N")]
    pub min_wallets: Option<usize>,

    /// Skip the metadata enrichment pass
    #[arg(long)]
    pub no_metadata: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Resolve mint metadata
#[derive(Parser, Debug)]
pub struct ResolveCmd {
    /// Mint addresses to resolve
    #[arg(value_name = "MINT", num_args = 1.., required = true)]
    pub mints: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Print the result as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
