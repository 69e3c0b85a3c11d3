//! CLI argument structures.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifier splitting, expansion and normalization for Go code bases
#[derive(Parser)]
#[command(name = "nomen")]
#[command(version = VERSION)]
#[command(about = "Split, expand and normalize the identifiers of a Go project")]
#[command(long_about = "
Mine a Go project for context, split every identifier into words, expand
abbreviations and recommend one normalized name per identifier.

Common Usage:

  # Analyze a project with every built-in algorithm
  nomen analyze ./service

  # Use a configuration file and write JSON results
  nomen analyze --config nomen.yml --out .nomen ./service

  # Start from the default configuration
  nomen print-default-config > nomen.yml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze every Go file below a directory
    Analyze(AnalyzeArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a configuration file against the built-in registries
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),

    /// List registered miners, splitters and expanders
    #[command(name = "list-algorithms")]
    ListAlgorithms,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Root directory of the Go project
    pub root: PathBuf,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project reference recorded on every insight
    #[arg(short, long, env = "NOMEN_PROJECT")]
    pub project: Option<String>,

    /// Directory receiving identifiers.json and insights.json
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Override the number of worker threads per stage
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}
