//! Sinks for finished identifiers and package insights.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::analysis::Insight;
use crate::core::errors::{NomenError, Result};
use crate::core::identifier::Identifier;

/// Receives the output of an analysis run.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn store_identifiers(&self, identifiers: &[Identifier]) -> Result<()>;

    async fn store_insights(&self, insights: &[Insight]) -> Result<()>;
}

/// Writes `identifiers.json` and `insights.json` into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub const IDENTIFIERS_FILE: &'static str = "identifiers.json";
    pub const INSIGHTS_FILE: &'static str = "insights.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            NomenError::io(
                format!("Failed to create output directory: {}", self.dir.display()),
                e,
            )
        })?;

        let path = self.dir.join(file_name);
        let content = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| NomenError::io(format!("Failed to write {}", path.display()), e))?;
        info!("Wrote {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn store_identifiers(&self, identifiers: &[Identifier]) -> Result<()> {
        self.write(Self::IDENTIFIERS_FILE, identifiers).await
    }

    async fn store_insights(&self, insights: &[Insight]) -> Result<()> {
        self.write(Self::INSIGHTS_FILE, insights).await
    }
}

/// Keeps everything in memory; handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    identifiers: Mutex<Vec<Identifier>>,
    insights: Mutex<Vec<Insight>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn identifiers(&self) -> Vec<Identifier> {
        self.identifiers.lock().await.clone()
    }

    pub async fn insights(&self) -> Vec<Insight> {
        self.insights.lock().await.clone()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn store_identifiers(&self, identifiers: &[Identifier]) -> Result<()> {
        self.identifiers.lock().await.extend_from_slice(identifiers);
        Ok(())
    }

    async fn store_insights(&self, insights: &[Insight]) -> Result<()> {
        self.insights.lock().await.extend_from_slice(insights);
        Ok(())
    }
}
