//! Analysis pipeline.
//!
//! A run moves through **Read → Parse → Mine → Extract → Split → Expand →
//! Normalize**. Read, parse and mine complete before anything streams: every
//! later stage needs the full mined context. From extraction on, identifiers
//! flow through bounded queues, one tokio task per stage, each running its
//! transformation on blocking worker threads.
//!
//! ```ignore
//! use nomen_rs::core::config::NomenConfig;
//! use nomen_rs::core::pipeline::NomenPipeline;
//! use nomen_rs::core::source::FsSourceReader;
//!
//! let pipeline = NomenPipeline::new(NomenConfig::default())?;
//! let report = pipeline.analyze(&FsSourceReader::new("./service")).await?;
//! println!("rate: {:.3}", report.overall.rate());
//! ```

mod pipeline_executor;
mod pipeline_results;
mod pipeline_stages;

pub use pipeline_executor::NomenPipeline;
pub use pipeline_results::{AnalysisReport, AnalysisRun, RunStats};
