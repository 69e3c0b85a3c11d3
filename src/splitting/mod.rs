//! Identifier splitting strategies and the stage that applies them.

pub mod conserv;
pub mod greedy;
pub mod samurai;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::errors::{NomenError, Result};
use crate::core::identifier::Identifier;
use crate::mining::{MinedContext, GLOBAL_FREQUENCY, LOCAL_FREQUENCY};
use crate::text::Dictionary;

pub use conserv::ConservSplitter;
pub use greedy::GreedySplitter;
pub use samurai::SamuraiSplitter;

pub const CONSERV: &str = "conserv";
pub const GREEDY: &str = "greedy";
pub const SAMURAI: &str = "samurai";

/// Every splitter the default registry knows.
pub const BUILTIN_SPLITTERS: &[&str] = &[CONSERV, GREEDY, SAMURAI];

/// Turns an identifier name into ordered, lower-cased tokens.
pub trait Splitter: Send + Sync {
    fn name(&self) -> &'static str;

    fn split(&self, identifier: &Identifier) -> Vec<String>;
}

/// Builds a splitter from the mined context and the run's dictionary.
pub type SplitterFactory = fn(&Arc<MinedContext>, &Arc<Dictionary>) -> Result<Arc<dyn Splitter>>;

#[derive(Clone, Copy)]
struct Registration {
    factory: SplitterFactory,
    requires: &'static [&'static str],
}

/// Name → factory table for splitters.
#[derive(Clone)]
pub struct SplitterRegistry {
    entries: BTreeMap<String, Registration>,
}

impl SplitterRegistry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a factory together with the miners it cannot work without.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        requires: &'static [&'static str],
        factory: SplitterFactory,
    ) {
        self.entries
            .insert(name.into(), Registration { factory, requires });
    }

    fn entry(&self, name: &str) -> Result<&Registration> {
        self.entries
            .get(name)
            .ok_or_else(|| NomenError::unknown_algorithm("splitter", name))
    }

    /// Miners `name` depends on.
    pub fn requires(&self, name: &str) -> Result<&'static [&'static str]> {
        Ok(self.entry(name)?.requires)
    }

    pub fn create(
        &self,
        name: &str,
        context: &Arc<MinedContext>,
        dictionary: &Arc<Dictionary>,
    ) -> Result<Arc<dyn Splitter>> {
        (self.entry(name)?.factory)(context, dictionary)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for SplitterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CONSERV, &[], |_, _| Ok(Arc::new(ConservSplitter)));
        registry.register(GREEDY, &[], |_, dictionary| {
            Ok(Arc::new(GreedySplitter::new(Arc::clone(dictionary))))
        });
        registry.register(
            SAMURAI,
            &[GLOBAL_FREQUENCY, LOCAL_FREQUENCY],
            |context, _| Ok(Arc::new(SamuraiSplitter::from_context(context)?)),
        );
        registry
    }
}

impl std::fmt::Debug for SplitterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitterRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Applies every configured splitter to an identifier.
#[derive(Clone, Default)]
pub struct SplittingStage {
    splitters: Vec<Arc<dyn Splitter>>,
}

impl SplittingStage {
    pub fn new(splitters: Vec<Arc<dyn Splitter>>) -> Self {
        Self { splitters }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.splitters.iter().map(|s| s.name()).collect()
    }

    pub fn apply(&self, identifier: &mut Identifier) {
        for splitter in &self.splitters {
            let tokens = splitter.split(identifier);
            identifier.record_split(splitter.name(), tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DeclKind;
    use crate::lang::common::Position;

    #[test]
    fn test_registry_requirements_and_unknown_names() {
        let registry = SplitterRegistry::default();
        assert_eq!(registry.requires(CONSERV).unwrap(), &[] as &[&str]);
        assert_eq!(
            registry.requires(SAMURAI).unwrap(),
            &[GLOBAL_FREQUENCY, LOCAL_FREQUENCY]
        );
        let err = registry.requires("ouija").unwrap_err();
        assert_eq!(err.to_string(), "no factory for splitter 'ouija'");
    }

    #[test]
    fn test_samurai_without_frequency_tables_fails() {
        let registry = SplitterRegistry::default();
        let context = Arc::new(MinedContext::new());
        let dictionary = Arc::new(Dictionary::embedded());
        let err = registry.create(SAMURAI, &context, &dictionary).err().unwrap();
        assert!(err.is_configuration());
        assert!(registry.create(CONSERV, &context, &dictionary).is_ok());
    }

    #[test]
    fn test_stage_records_every_splitter() {
        let registry = SplitterRegistry::default();
        let context = Arc::new(MinedContext::new());
        let dictionary = Arc::new(Dictionary::embedded());
        let stage = SplittingStage::new(vec![
            registry.create(CONSERV, &context, &dictionary).unwrap(),
            registry.create(GREEDY, &context, &dictionary).unwrap(),
        ]);
        let mut identifier = Identifier::new(
            "id",
            "a.go",
            "a",
            "ctrlDel",
            DeclKind::Func,
            Position::new(1, 1),
        );

        stage.apply(&mut identifier);
        assert_eq!(stage.names(), vec![CONSERV, GREEDY]);
        assert_eq!(
            identifier.split_tokens(CONSERV).unwrap(),
            vec!["ctrl", "del"]
        );
        assert!(identifier.splits.contains_key(GREEDY));
    }
}
