//! # nomen-rs: identifier normalization for Go code bases
//!
//! Mines a Go project for context (comments, declarations, scopes, token
//! frequencies), extracts every addressable identifier, splits it into
//! word-like tokens with several strategies, expands abbreviated tokens from
//! the mined context, and picks one recommended rewrite per identifier.
//! Results roll up into per-package insights.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  core::pipeline   Read → Parse → Mine → Extract → Split →    │
//! │                   Expand → Normalize → Insight               │
//! ├──────────────┬──────────────┬──────────────┬─────────────────┤
//! │  lang        │  mining      │  splitting   │  expansion      │
//! │ • tree-sitter│ • comments   │ • conserv    │ • noexp         │
//! │ • Go lowering│ • decls      │ • greedy     │ • basic         │
//! │              │ • scopes     │ • samurai    │ • amap          │
//! │              │ • frequency  │              │                 │
//! ├──────────────┴──────────────┴──────────────┴─────────────────┤
//! │  analysis (extraction, normalization, insight)  │  io sinks  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nomen_rs::{FsSourceReader, NomenConfig, NomenPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = NomenPipeline::new(NomenConfig::default())?;
//!     let report = pipeline.analyze(&FsSourceReader::new("./service")).await?;
//!
//!     for insight in &report.insights {
//!         println!("{}: {:.3}", insight.package, insight.rate());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Run assembly, data model and the pipeline itself
pub mod core {
    //! Canonical addressing, configuration, errors, the identifier record
    //! and the pipeline orchestrator.

    pub mod addressing;
    pub mod config;
    pub mod errors;
    pub mod identifier;
    pub mod pipeline;
    pub mod source;
}

// Go front end
pub mod lang {
    //! Tree-sitter parsing and the owned Go syntax model.

    pub mod common;
    pub mod go;
    pub mod registry;
}

pub mod analysis;
pub mod expansion;
pub mod io;
pub mod mining;
pub mod splitting;
pub mod text;

// Re-export primary types for convenience
pub use crate::core::config::NomenConfig;
pub use crate::core::errors::{NomenError, Result, ResultExt};
pub use crate::core::identifier::{DeclKind, Expansion, Identifier, Normalization, Split};
pub use crate::core::pipeline::{AnalysisReport, AnalysisRun, NomenPipeline};
pub use crate::core::source::{FsSourceReader, RawSource, SourceReader};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
