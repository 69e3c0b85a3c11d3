//! Configuration types and management for nomen-rs.
//!
//! A configuration names the miners, splitters and expanders of a run and
//! sizes the pipeline. Names are only checked for shape here; whether a
//! registry knows them is decided when the pipeline is assembled.

pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{NomenError, Result};
use crate::expansion::BUILTIN_EXPANDERS;
use crate::mining::BUILTIN_MINERS;
use crate::splitting::BUILTIN_SPLITTERS;
use crate::text::Dictionary;

pub use validation::{
    validate_bounded_usize, validate_non_empty, validate_positive_usize, validate_unique_names,
};

/// Main configuration of an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomenConfig {
    /// Project reference recorded on every insight
    #[serde(default)]
    pub project: String,

    /// Miners to run, by registry name
    #[serde(default = "NomenConfig::default_miners")]
    pub miners: Vec<String>,

    /// Splitters to run, by registry name
    #[serde(default = "NomenConfig::default_splitters")]
    pub splitters: Vec<String>,

    /// Expanders to run, by registry name
    #[serde(default = "NomenConfig::default_expanders")]
    pub expanders: Vec<String>,

    /// Concurrency settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Word list settings
    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

impl Default for NomenConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            miners: Self::default_miners(),
            splitters: Self::default_splitters(),
            expanders: Self::default_expanders(),
            pipeline: PipelineConfig::default(),
            dictionary: DictionaryConfig::default(),
        }
    }
}

impl NomenConfig {
    fn default_miners() -> Vec<String> {
        BUILTIN_MINERS.iter().map(|s| s.to_string()).collect()
    }

    fn default_splitters() -> Vec<String> {
        BUILTIN_SPLITTERS.iter().map(|s| s.to_string()).collect()
    }

    fn default_expanders() -> Vec<String> {
        BUILTIN_EXPANDERS.iter().map(|s| s.to_string()).collect()
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            NomenError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            NomenError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.splitters, "splitters")?;
        validate_unique_names(&self.miners, "miners")?;
        validate_unique_names(&self.splitters, "splitters")?;
        validate_unique_names(&self.expanders, "expanders")?;

        self.pipeline.validate()?;
        self.dictionary.validate()?;

        Ok(())
    }
}

/// Pipeline sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent blocking jobs per streaming stage
    #[serde(default = "PipelineConfig::default_workers")]
    pub workers: usize,

    /// Capacity of every inter-stage queue
    #[serde(default = "PipelineConfig::default_queue_capacity")]
    pub queue_capacity: usize,

    /// Threads available to the mining stage
    #[serde(default = "PipelineConfig::default_mining_concurrency")]
    pub mining_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: Self::default_workers(),
            queue_capacity: Self::default_queue_capacity(),
            mining_concurrency: Self::default_mining_concurrency(),
        }
    }
}

impl PipelineConfig {
    const MAX_QUEUE_CAPACITY: usize = 65_536;

    fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    const fn default_queue_capacity() -> usize {
        1
    }

    fn default_mining_concurrency() -> usize {
        BUILTIN_MINERS.len()
    }

    /// Validate pipeline configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.workers, "pipeline.workers")?;
        validate_bounded_usize(
            self.queue_capacity,
            1,
            Self::MAX_QUEUE_CAPACITY,
            "pipeline.queue_capacity",
        )?;
        validate_positive_usize(self.mining_concurrency, "pipeline.mining_concurrency")?;
        Ok(())
    }
}

/// Word list used for mining, greedy splitting and scoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Extra newline-separated word list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Use only the word list at `path` instead of extending the embedded one
    #[serde(default)]
    pub replace: bool,
}

impl DictionaryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.replace && self.path.is_none() {
            return Err(NomenError::config_field(
                "dictionary.replace requires dictionary.path",
                "dictionary.path",
            ));
        }
        Ok(())
    }

    /// Build the dictionary this configuration describes.
    pub fn load(&self) -> Result<Dictionary> {
        let Some(path) = &self.path else {
            return Ok(Dictionary::embedded());
        };

        let loaded = Dictionary::from_file(path)?;
        if self.replace {
            return Ok(loaded);
        }
        let mut dictionary = Dictionary::embedded();
        dictionary.extend(loaded);
        debug!("Dictionary extended to {} words", dictionary.len());
        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = NomenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.queue_capacity, 1);
        assert!(config.miners.iter().any(|m| m == "declarations"));
        assert!(config.splitters.iter().any(|s| s == "samurai"));
        assert!(config.expanders.iter().any(|e| e == "amap"));
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nomen.yml");

        let mut config = NomenConfig::default();
        config.project = "github.com/acme/widgets".to_string();
        config.pipeline.workers = 3;
        config.to_yaml_file(&path).unwrap();

        let loaded = NomenConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.project, "github.com/acme/widgets");
        assert_eq!(loaded.pipeline.workers, 3);
        assert_eq!(loaded.splitters, config.splitters);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: NomenConfig = serde_yaml::from_str("splitters: [conserv]\nexpanders: [noexp]\n").unwrap();
        assert_eq!(config.splitters, vec!["conserv"]);
        assert_eq!(config.miners.len(), BUILTIN_MINERS.len());
        assert_eq!(config.pipeline.queue_capacity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = NomenConfig::default();
        config.pipeline.workers = 0;
        assert!(config.validate().is_err());

        let mut config = NomenConfig::default();
        config.pipeline.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = NomenConfig::default();
        config.splitters.clear();
        assert!(config.validate().is_err());

        let mut config = NomenConfig::default();
        config.expanders.push("noexp".to_string());
        assert!(config.validate().is_err());

        let mut config = NomenConfig::default();
        config.dictionary.replace = true;
        assert!(matches!(config.validate(), Err(NomenError::Config { .. })));
    }

    #[test]
    fn test_dictionary_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zarasa").unwrap();

        let extended = DictionaryConfig {
            path: Some(file.path().to_path_buf()),
            replace: false,
        }
        .load()
        .unwrap();
        assert!(extended.contains("zarasa"));
        assert!(extended.contains("function"));

        let replaced = DictionaryConfig {
            path: Some(file.path().to_path_buf()),
            replace: true,
        }
        .load()
        .unwrap();
        assert_eq!(replaced.len(), 1);

        assert!(DictionaryConfig::default().load().unwrap().contains("function"));
    }
}
