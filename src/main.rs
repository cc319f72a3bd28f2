//! cabal-radar - Shared Token Purchase Discovery for Solana Wallets
//!
//! Walks the transaction history of a wallet group, classifies real
//! purchases, and reports the tokens the group has in common.

mod domain;
mod ports;
mod adapters;
mod application;
mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::cli::{CliApp, Command, ResolveCmd, ScanCmd};
use crate::adapters::helius::HeliusClient;
use crate::adapters::metadata::TokenMetadataClient;
use crate::application::{ScanOrchestrator, ScanReport, ScanRequest, ScannerConfig};
use crate::config::{load_config, Config};
use crate::domain::{AcquisitionClassifier, AggregationMode, ClassifierConfig};
use crate::ports::metadata::MetadataPort;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (the API key goes here, not in config)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Scan(cmd) => scan_command(cmd).await,
        Command::Resolve(cmd) => resolve_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
}

fn load_expanded_config(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
    load_config(&expanded).with_context(|| format!("Failed to load configuration from {}", expanded))
}

fn require_api_key(config: &Config) -> Result<String> {
    match config.source.get_api_key() {
        Some(key) => Ok(key),
        None => bail!(
            "No API key configured. Set HELIUS_API_KEY in the environment \
             (or .env), or api_key under [source] in the config file."
        ),
    }
}

async fn scan_command(cmd: ScanCmd) -> Result<()> {
    let config = load_expanded_config(&cmd.config)?;
    let api_key = require_api_key(&config)?;

    // CLI overrides win over the config file
    let mode = match cmd.mode.as_deref() {
        Some("strict") => AggregationMode::StrictIntersection,
        Some("threshold") => AggregationMode::Threshold {
            min_wallets: cmd.min_wallets.unwrap_or(config.scanner.min_wallets),
        },
        Some(other) => bail!("unknown mode '{}', expected 'threshold' or 'strict'", other),
        None => match cmd.min_wallets {
            Some(min_wallets) => AggregationMode::Threshold { min_wallets },
            None => config.aggregation_mode(),
        },
    };

    let request = ScanRequest {
        addresses: cmd.addresses,
        pages: cmd.pages.unwrap_or(config.scanner.pages),
        page_size: cmd.page_size.unwrap_or(config.scanner.page_size),
        mode,
    };

    let history = HeliusClient::with_config(config.helius_config(api_key.clone()))
        .context("Failed to create history client")?;

    let metadata: Option<Arc<dyn MetadataPort>> = if config.metadata.enabled && !cmd.no_metadata {
        let client = TokenMetadataClient::with_config(config.metadata_config(api_key))
            .context("Failed to create metadata client")?;
        Some(Arc::new(client))
    } else {
        None
    };

    let orchestrator = Arc::new(ScanOrchestrator::new(
        Arc::new(history),
        metadata,
        AcquisitionClassifier::new(ClassifierConfig::from(&config)),
        ScannerConfig::from(&config),
    ));

    // Ctrl+C abandons the run between wallets
    let orch = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        orch.stop().await;
    });

    let report = orchestrator
        .run(&request)
        .await
        .context("Scan request rejected")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ScanReport) {
    for wallet in &report.wallets {
        match &wallet.failure {
            Some(failure) => println!(
                "wallet {}: {} page(s), {} tx, {} acquired (partial: {})",
                wallet.address,
                wallet.pages_fetched,
                wallet.transactions_seen,
                wallet.acquired_mints,
                failure
            ),
            None => println!(
                "wallet {}: {} page(s), {} tx, {} acquired",
                wallet.address,
                wallet.pages_fetched,
                wallet.transactions_seen,
                wallet.acquired_mints
            ),
        }
    }

    if report.list.is_empty() {
        println!("\nNo shared token purchases found.");
        return;
    }

    println!("\n{} shared token(s):\n", report.found);
    for token in &report.list {
        let label = token
            .meta
            .as_ref()
            .and_then(|m| m.symbol.clone().or_else(|| m.name.clone()))
            .unwrap_or_default();
        if label.is_empty() {
            println!("{}  ({} wallets)", token.mint, token.count);
        } else {
            println!("{}  [{}]  ({} wallets)", token.mint, label, token.count);
        }
        for wallet in &token.wallets {
            println!("    {}", wallet);
        }
        for example in &token.examples {
            match example.time {
                Some(time) => println!("    e.g. {} at {}", example.signature, time),
                None => println!("    e.g. {}", example.signature),
            }
        }
    }
}

async fn resolve_command(cmd: ResolveCmd) -> Result<()> {
    let config = load_expanded_config(&cmd.config)?;
    let api_key = require_api_key(&config)?;

    let client = TokenMetadataClient::with_config(config.metadata_config(api_key))
        .context("Failed to create metadata client")?;

    let resolved = client
        .resolve(&cmd.mints)
        .await
        .context("Metadata lookup failed")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for mint in &cmd.mints {
        match resolved.get(mint) {
            Some(meta) => println!(
                "{}  name={}  symbol={}",
                mint,
                meta.name.as_deref().unwrap_or("-"),
                meta.symbol.as_deref().unwrap_or("-")
            ),
            None => println!("{}  (not found)", mint),
        }
    }

    Ok(())
}
