//! Assembles a configured run and drives it from raw sources to the
//! normalized identifier stream.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::pipeline_results::{AnalysisReport, AnalysisRun, RunStats};
use super::pipeline_stages::{parse_sources, spawn_extraction, spawn_stage};
use crate::analysis::{Normalizer, ScoreStrategy};
use crate::core::config::NomenConfig;
use crate::core::errors::{NomenError, Result};
use crate::core::source::SourceReader;
use crate::expansion::{ExpanderRegistry, ExpansionStage};
use crate::mining::{mine_corpus, Miner, MinerRegistry};
use crate::splitting::{SplitterRegistry, SplittingStage};
use crate::text::Dictionary;

/// A validated, ready-to-run pipeline.
///
/// Every configured name is resolved against the registries and every miner
/// requirement is checked on construction, so configuration errors surface
/// before a single file is read.
pub struct NomenPipeline {
    config: NomenConfig,
    dictionary: Arc<Dictionary>,
    miners: MinerRegistry,
    splitters: SplitterRegistry,
    expanders: ExpanderRegistry,
    normalizer: Normalizer,
}

impl NomenPipeline {
    /// Pipeline over the built-in registries and the configured dictionary.
    pub fn new(config: NomenConfig) -> Result<Self> {
        config.validate()?;
        let dictionary = Arc::new(config.dictionary.load()?);
        Self::with_registries(
            config,
            dictionary,
            MinerRegistry::default(),
            SplitterRegistry::default(),
            ExpanderRegistry::default(),
        )
    }

    pub fn with_registries(
        config: NomenConfig,
        dictionary: Arc<Dictionary>,
        miners: MinerRegistry,
        splitters: SplitterRegistry,
        expanders: ExpanderRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::with_dictionary(Arc::clone(&dictionary));
        let pipeline = Self {
            config,
            dictionary,
            miners,
            splitters,
            expanders,
            normalizer,
        };
        pipeline.check_assembly()?;
        Ok(pipeline)
    }

    /// Replace the default dictionary-coverage score.
    pub fn with_score_strategy(mut self, strategy: Arc<dyn ScoreStrategy>) -> Self {
        self.normalizer = Normalizer::new(strategy);
        self
    }

    pub fn config(&self) -> &NomenConfig {
        &self.config
    }

    fn check_assembly(&self) -> Result<()> {
        for name in &self.config.miners {
            if !self.miners.names().any(|known| known == name) {
                return Err(NomenError::unknown_algorithm("miner", name));
            }
        }

        for name in &self.config.splitters {
            let requires = self.splitters.requires(name)?;
            self.check_requirements(name, requires)?;
        }

        for name in &self.config.expanders {
            let requires = self.expanders.requires(name)?;
            self.check_requirements(name, requires)?;
            let applicable_on = self.expanders.applicable_on(name)?;
            if !self.config.splitters.iter().any(|s| s == applicable_on) {
                warn!(
                    "Expander '{}' runs on splitter '{}', which is not configured; it will produce nothing",
                    name, applicable_on
                );
            }
        }
        Ok(())
    }

    fn check_requirements(&self, requested_by: &str, requires: &[&str]) -> Result<()> {
        for miner in requires {
            if !self.config.miners.iter().any(|m| m == miner) {
                return Err(NomenError::config_field(
                    format!("'{requested_by}' needs the '{miner}' miner, which is not configured"),
                    "miners",
                ));
            }
        }
        Ok(())
    }

    fn build_miners(&self) -> Result<Vec<Box<dyn Miner>>> {
        self.config
            .miners
            .iter()
            .map(|name| self.miners.create(name, &self.dictionary))
            .collect()
    }

    /// Read, parse and mine, then start the streaming stages.
    ///
    /// Fails only on configuration problems or when no file parses; files
    /// that fail to read or parse are logged and dropped.
    pub async fn start(&self, reader: &dyn SourceReader) -> Result<AnalysisRun> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        let workers = self.config.pipeline.workers;
        let capacity = self.config.pipeline.queue_capacity;
        info!("Starting run {} for '{}'", run_id, self.config.project);

        let raw = reader.read_sources().await?;
        let files_read = raw.len();
        info!("Read {} source files", files_read);

        let parsed = parse_sources(raw, workers).await?;
        let (valid, failed): (Vec<_>, Vec<_>) = parsed.into_iter().partition(|f| f.is_valid());
        if valid.is_empty() {
            return Err(NomenError::pipeline("parse", "no source file could be parsed")
                .with_processed_count(files_read));
        }
        let stats = RunStats {
            files_read,
            files_parsed: valid.len(),
            failed_files: failed.into_iter().map(|f| f.name).collect(),
            cancelled: false,
        };
        info!(
            "Parsed {} of {} files in {:?}",
            stats.files_parsed,
            files_read,
            clock.elapsed()
        );

        let files: Arc<Vec<_>> = Arc::new(valid.into_iter().map(Arc::new).collect());
        let miners = self.build_miners()?;
        let concurrency = self.config.pipeline.mining_concurrency;
        let corpus = Arc::clone(&files);
        let context = tokio::task::spawn_blocking(move || mine_corpus(miners, &corpus, concurrency))
            .await
            .map_err(|e| NomenError::internal(format!("Mining task failed: {e}")))??;
        let context = Arc::new(context);
        info!(
            "Mined {} tables in {:?}",
            context.names().count(),
            clock.elapsed()
        );

        let splitters = self
            .config
            .splitters
            .iter()
            .map(|name| self.splitters.create(name, &context, &self.dictionary))
            .collect::<Result<Vec<_>>>()?;
        let expanders = self
            .config
            .expanders
            .iter()
            .map(|name| self.expanders.create(name, &context, &self.dictionary))
            .collect::<Result<Vec<_>>>()?;
        let splitting = SplittingStage::new(splitters);
        let expansion = ExpansionStage::new(expanders);
        let normalizer = self.normalizer.clone();
        debug!("Splitters: {:?}", splitting.names());

        let cancel = CancellationToken::new();
        let (extract_tx, extract_rx) = mpsc::channel(capacity);
        let (split_tx, split_rx) = mpsc::channel(capacity);
        let (expand_tx, expand_rx) = mpsc::channel(capacity);
        let (output_tx, output_rx) = mpsc::channel(capacity);

        let mut handles = spawn_extraction(&files, extract_tx, &cancel);
        handles.push(spawn_stage(
            "split",
            extract_rx,
            split_tx,
            workers,
            cancel.clone(),
            move |identifier| splitting.apply(identifier),
        ));
        handles.push(spawn_stage(
            "expand",
            split_rx,
            expand_tx,
            workers,
            cancel.clone(),
            move |identifier| expansion.apply(identifier),
        ));
        handles.push(spawn_stage(
            "normalize",
            expand_rx,
            output_tx,
            workers,
            cancel.clone(),
            move |identifier| normalizer.apply(identifier),
        ));

        Ok(AnalysisRun {
            run_id,
            started_at,
            project: self.config.project.clone(),
            stats,
            output: output_rx,
            cancel,
            handles,
        })
    }

    /// Run to completion.
    pub async fn analyze(&self, reader: &dyn SourceReader) -> Result<AnalysisReport> {
        self.start(reader).await?.collect().await
    }
}

impl std::fmt::Debug for NomenPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NomenPipeline")
            .field("config", &self.config)
            .field("dictionary_words", &self.dictionary.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_executor_tests.rs"]
mod tests;
