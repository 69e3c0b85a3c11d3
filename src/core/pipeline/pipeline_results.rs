//! Handle of a running analysis and the report it folds into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{overall, Insight, InsightAggregator};
use crate::core::errors::Result;
use crate::core::identifier::Identifier;
use crate::io::ResultSink;

/// File-level counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub files_read: usize,
    pub files_parsed: usize,
    /// Names of files dropped before mining
    pub failed_files: Vec<String>,
    /// Set when the run was cancelled before the queues drained
    pub cancelled: bool,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub project: String,
    pub stats: RunStats,
    pub identifiers: Vec<Identifier>,
    pub insights: Vec<Insight>,
    pub overall: Insight,
}

impl AnalysisReport {
    /// Identifiers of one file, sorted by canonical ID.
    pub fn identifiers_in(&self, file: &str) -> Vec<&Identifier> {
        let mut found: Vec<&Identifier> =
            self.identifiers.iter().filter(|id| id.file == file).collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn find(&self, id: &str) -> Option<&Identifier> {
        self.identifiers.iter().find(|identifier| identifier.id == id)
    }
}

/// A run in flight: a stream of normalized identifiers plus the tasks
/// producing them.
///
/// Dropping the handle cancels the run, so producers blocked on a full queue
/// wind down instead of lingering.
pub struct AnalysisRun {
    pub(crate) run_id: Uuid,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) project: String,
    pub(crate) stats: RunStats,
    pub(crate) output: mpsc::Receiver<Identifier>,
    pub(crate) cancel: CancellationToken,
    pub(crate) handles: Vec<JoinHandle<()>>,
}

impl AnalysisRun {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Next normalized identifier, `None` once every stage has finished.
    pub async fn next(&mut self) -> Option<Identifier> {
        self.output.recv().await
    }

    /// Stop every stage; queues close and [`AnalysisRun::next`] soon returns `None`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain the run and aggregate its insights.
    pub async fn collect(mut self) -> Result<AnalysisReport> {
        let mut identifiers = Vec::new();
        let mut aggregator = InsightAggregator::new(self.project.clone());
        while let Some(identifier) = self.output.recv().await {
            aggregator.add(&identifier);
            identifiers.push(identifier);
        }

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("Pipeline task ended abnormally: {}", e);
            }
        }

        let mut stats = self.stats.clone();
        stats.cancelled = self.cancel.is_cancelled();

        let insights = aggregator.finish();
        let overall = overall(&self.project, &insights);
        info!(
            "Run {} finished: {} identifiers in {} packages, rate {:.3}",
            self.run_id,
            identifiers.len(),
            insights.len(),
            overall.rate()
        );

        Ok(AnalysisReport {
            run_id: self.run_id,
            started_at: self.started_at,
            project: self.project.clone(),
            stats,
            identifiers,
            insights,
            overall,
        })
    }

    /// Drain the run and hand its output to `sink`.
    pub async fn persist(self, sink: &dyn ResultSink) -> Result<AnalysisReport> {
        let report = self.collect().await?;
        sink.store_identifiers(&report.identifiers).await?;
        sink.store_insights(&report.insights).await?;
        Ok(report)
    }
}

impl Drop for AnalysisRun {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for AnalysisRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRun")
            .field("run_id", &self.run_id)
            .field("project", &self.project)
            .field("stats", &self.stats)
            .field("tasks", &self.handles.len())
            .finish()
    }
}
