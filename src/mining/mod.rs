//! Context miners.
//!
//! A miner visits every parsed file once, folding what it sees into its own
//! accumulator, and finally hands back one table. Miners never talk to each
//! other; the mining stage runs them side by side and publishes all tables at
//! once as a [`MinedContext`] keyed by miner name.

pub mod comments;
pub mod declarations;
pub mod frequency;
pub mod scopes;

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::errors::{NomenError, Result};
use crate::core::source::SourceFile;
use crate::text::Dictionary;

pub use comments::CommentsMiner;
pub use declarations::{DeclarationsMiner, MinedDeclaration};
pub use frequency::{FrequencyTable, GlobalFrequencyMiner, LocalFrequencyMiner};
pub use scopes::{ScopedDeclaration, ScopesMiner};

pub const COMMENTS: &str = "comments";
pub const DECLARATIONS: &str = "declarations";
pub const SCOPES: &str = "scopes";
pub const GLOBAL_FREQUENCY: &str = "global_frequency";
pub const LOCAL_FREQUENCY: &str = "local_frequency";

/// Every miner the default registry knows, in registration order.
pub const BUILTIN_MINERS: &[&str] = &[
    COMMENTS,
    DECLARATIONS,
    SCOPES,
    GLOBAL_FREQUENCY,
    LOCAL_FREQUENCY,
];

/// A pass over the parsed corpus.
pub trait Miner: Send {
    fn name(&self) -> &'static str;

    /// Fold one file into the accumulator. Files without a syntax tree are ignored.
    fn consume(&mut self, file: &SourceFile);

    fn results(self: Box<Self>) -> MinedTable;
}

/// The table a miner publishes.
#[derive(Debug, Clone)]
pub enum MinedTable {
    /// Cleaned comment texts per file name
    Comments(AHashMap<String, Vec<String>>),
    /// Words and phrases per canonical ID
    Declarations(AHashMap<String, MinedDeclaration>),
    /// Raw scope fragments per canonical ID
    Scopes(AHashMap<String, ScopedDeclaration>),
    GlobalFrequency(FrequencyTable),
    /// Frequency tables per file name
    LocalFrequency(AHashMap<String, FrequencyTable>),
}

impl MinedTable {
    pub fn len(&self) -> usize {
        match self {
            MinedTable::Comments(t) => t.len(),
            MinedTable::Declarations(t) => t.len(),
            MinedTable::Scopes(t) => t.len(),
            MinedTable::GlobalFrequency(t) => t.distinct(),
            MinedTable::LocalFrequency(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable lookup of every mined table, keyed by miner name.
#[derive(Debug, Clone, Default)]
pub struct MinedContext {
    tables: BTreeMap<String, Arc<MinedTable>>,
}

impl MinedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: MinedTable) {
        self.tables.insert(name.into(), Arc::new(table));
    }

    pub fn get(&self, name: &str) -> Option<&MinedTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Fail with a configuration error unless `name` was mined.
    pub fn require(&self, name: &str, requested_by: &str) -> Result<&MinedTable> {
        self.get(name).ok_or_else(|| {
            NomenError::config_field(
                format!("'{requested_by}' needs the '{name}' miner, which is not configured"),
                "miners",
            )
        })
    }

    pub fn comments(&self) -> Option<&AHashMap<String, Vec<String>>> {
        match self.get(COMMENTS)? {
            MinedTable::Comments(table) => Some(table),
            _ => None,
        }
    }

    pub fn declarations(&self) -> Option<&AHashMap<String, MinedDeclaration>> {
        match self.get(DECLARATIONS)? {
            MinedTable::Declarations(table) => Some(table),
            _ => None,
        }
    }

    pub fn scopes(&self) -> Option<&AHashMap<String, ScopedDeclaration>> {
        match self.get(SCOPES)? {
            MinedTable::Scopes(table) => Some(table),
            _ => None,
        }
    }

    pub fn global_frequency(&self) -> Option<&FrequencyTable> {
        match self.get(GLOBAL_FREQUENCY)? {
            MinedTable::GlobalFrequency(table) => Some(table),
            _ => None,
        }
    }

    pub fn local_frequency(&self) -> Option<&AHashMap<String, FrequencyTable>> {
        match self.get(LOCAL_FREQUENCY)? {
            MinedTable::LocalFrequency(table) => Some(table),
            _ => None,
        }
    }
}

/// Builds a miner; miners that filter words share the run's dictionary.
pub type MinerFactory = fn(&Arc<Dictionary>) -> Box<dyn Miner>;

/// Name → factory table for miners.
#[derive(Clone)]
pub struct MinerRegistry {
    factories: BTreeMap<String, MinerFactory>,
}

impl MinerRegistry {
    /// A registry without any factory.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, factory: MinerFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn create(&self, name: &str, dictionary: &Arc<Dictionary>) -> Result<Box<dyn Miner>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| NomenError::unknown_algorithm("miner", name))?;
        Ok(factory(dictionary))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for MinerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(COMMENTS, |_| Box::new(CommentsMiner::default()));
        registry.register(DECLARATIONS, |dictionary| {
            Box::new(DeclarationsMiner::new(Arc::clone(dictionary)))
        });
        registry.register(SCOPES, |_| Box::new(ScopesMiner::default()));
        registry.register(GLOBAL_FREQUENCY, |_| Box::new(GlobalFrequencyMiner::default()));
        registry.register(LOCAL_FREQUENCY, |_| Box::new(LocalFrequencyMiner::default()));
        registry
    }
}

impl std::fmt::Debug for MinerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinerRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Run every miner over every file on a bounded thread pool and publish the
/// tables once all of them are done.
pub fn mine_corpus(
    miners: Vec<Box<dyn Miner>>,
    files: &[Arc<SourceFile>],
    concurrency: usize,
) -> Result<MinedContext> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .thread_name(|index| format!("nomen-miner-{index}"))
        .build()
        .map_err(|e| NomenError::internal(format!("Failed to build mining pool: {e}")))?;

    info!(
        "Mining {} files with {} miners",
        files.len(),
        miners.len()
    );

    let mut miners = miners;
    pool.install(|| {
        miners.par_iter_mut().for_each(|miner| {
            for file in files {
                miner.consume(file);
            }
        });
    });

    let mut context = MinedContext::new();
    for miner in miners {
        let name = miner.name();
        let table = miner.results();
        debug!("Miner '{}' produced {} entries", name, table.len());
        context.insert(name, table);
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::RawSource;
    use crate::lang::go::GoParser;

    fn parsed(name: &str, source: &str) -> Arc<SourceFile> {
        let mut parser = GoParser::new().unwrap();
        Arc::new(SourceFile::parse(RawSource::new(name, source), &mut parser))
    }

    #[test]
    fn test_registry_knows_builtins() {
        let registry = MinerRegistry::default();
        let names: Vec<&str> = registry.names().collect();
        for builtin in BUILTIN_MINERS {
            assert!(names.contains(builtin), "missing {builtin}");
        }

        let dictionary = Arc::new(Dictionary::embedded());
        let miner = registry.create(SCOPES, &dictionary).unwrap();
        assert_eq!(miner.name(), SCOPES);
    }

    #[test]
    fn test_registry_unknown_name() {
        let dictionary = Arc::new(Dictionary::embedded());
        let err = MinerRegistry::default()
            .create("telepathy", &dictionary)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no factory for miner 'telepathy'");
    }

    #[test]
    fn test_mine_corpus_publishes_every_table() {
        let files = vec![
            parsed("main.go", "package main\n\n// run starts the server\nfunc run() {}\n"),
            parsed("broken.go", "package main\nfunc {"),
        ];
        let dictionary = Arc::new(Dictionary::embedded());
        let registry = MinerRegistry::default();
        let miners = BUILTIN_MINERS
            .iter()
            .map(|name| registry.create(name, &dictionary).unwrap())
            .collect();

        let context = mine_corpus(miners, &files, 2).unwrap();
        for name in BUILTIN_MINERS {
            assert!(context.contains(name));
        }
        assert_eq!(context.declarations().unwrap().len(), 1);
        assert!(context.global_frequency().unwrap().count("run") >= 2);
        assert!(context.local_frequency().unwrap().contains_key("main.go"));
        assert!(!context.local_frequency().unwrap().contains_key("broken.go"));
    }

    #[test]
    fn test_require_reports_missing_miner() {
        let context = MinedContext::new();
        let err = context.require(DECLARATIONS, "basic").unwrap_err();
        assert!(err.is_configuration());
        assert!(context.declarations().is_none());
    }
}
