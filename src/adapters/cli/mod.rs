//! CLI Adapter
//!
//! Command-line argument definitions.

pub mod commands;

pub use commands::{CliApp, Command, ResolveCmd, ScanCmd};
