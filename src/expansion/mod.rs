//! Abbreviation expansion strategies and the stage that applies them.
//!
//! Every expander is wired to exactly one splitter and only runs for
//! identifiers that splitter has already processed. Context lookups go by the
//! identifier's canonical ID, then by its parent's; when neither has mined
//! context the split tokens are returned unchanged.

pub mod amap;
pub mod basic;
pub mod noexp;

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use tracing::warn;

use crate::core::errors::{NomenError, Result};
use crate::core::identifier::{Expansion, Identifier};
use crate::mining::{MinedContext, DECLARATIONS, SCOPES};
use crate::splitting::{CONSERV, GREEDY, SAMURAI};
use crate::text::Dictionary;

pub use amap::AmapExpander;
pub use basic::BasicExpander;
pub use noexp::NoExpander;

pub const NOEXP: &str = "noexp";
pub const BASIC: &str = "basic";
pub const AMAP: &str = "amap";

/// Every expander the default registry knows.
pub const BUILTIN_EXPANDERS: &[&str] = &[NOEXP, BASIC, AMAP];

/// Most candidates kept for one token when several compete.
pub const MAX_CANDIDATES: usize = 3;

pub trait Expander: Send + Sync {
    fn name(&self) -> &'static str;

    /// The splitter whose tokens this expander consumes.
    fn applicable_on(&self) -> &'static str;

    /// One expansion per split token, or nothing when the identifier was not
    /// split by [`Expander::applicable_on`].
    fn expand(&self, identifier: &Identifier) -> Vec<Expansion>;
}

/// Keep the [`MAX_CANDIDATES`] candidates closest to `token` by edit distance.
///
/// Sorting is stable, so equally distant candidates keep their input order.
pub fn handle_multiple_expansions(token: &str, candidates: Vec<String>) -> Vec<String> {
    let mut ranked: Vec<(usize, String)> = candidates
        .into_iter()
        .map(|candidate| (edit_distance::edit_distance(token, &candidate), candidate))
        .collect();
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked.truncate(MAX_CANDIDATES);
    ranked.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Find mined context for an identifier, falling back to its parent.
pub fn lookup_context<'t, T>(
    table: &'t AHashMap<String, T>,
    identifier: &Identifier,
) -> Option<&'t T> {
    table.get(&identifier.id).or_else(|| {
        if identifier.has_parent() {
            table.get(&identifier.parent)
        } else {
            None
        }
    })
}

/// Number the per-token candidate lists; an empty list becomes the token itself.
pub fn build_expansions<F>(splitting_algorithm: &str, tokens: &[String], mut candidates: F) -> Vec<Expansion>
where
    F: FnMut(&str) -> Vec<String>,
{
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let mut values = candidates(token);
            if values.is_empty() {
                values.push(token.clone());
            }
            Expansion {
                order: index + 1,
                splitting_algorithm: splitting_algorithm.to_string(),
                from: token.clone(),
                values,
            }
        })
        .collect()
}

/// Every token expands to itself.
pub fn identity_expansions(splitting_algorithm: &str, tokens: &[String]) -> Vec<Expansion> {
    build_expansions(splitting_algorithm, tokens, |_| Vec::new())
}

pub type ExpanderFactory = fn(&Arc<MinedContext>, &Arc<Dictionary>) -> Result<Arc<dyn Expander>>;

#[derive(Clone, Copy)]
struct Registration {
    factory: ExpanderFactory,
    applicable_on: &'static str,
    requires: &'static [&'static str],
}

/// Name → factory table for expanders.
#[derive(Clone)]
pub struct ExpanderRegistry {
    entries: BTreeMap<String, Registration>,
}

impl ExpanderRegistry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        applicable_on: &'static str,
        requires: &'static [&'static str],
        factory: ExpanderFactory,
    ) {
        self.entries.insert(
            name.into(),
            Registration {
                factory,
                applicable_on,
                requires,
            },
        );
    }

    fn entry(&self, name: &str) -> Result<&Registration> {
        self.entries
            .get(name)
            .ok_or_else(|| NomenError::unknown_algorithm("expander", name))
    }

    pub fn requires(&self, name: &str) -> Result<&'static [&'static str]> {
        Ok(self.entry(name)?.requires)
    }

    pub fn applicable_on(&self, name: &str) -> Result<&'static str> {
        Ok(self.entry(name)?.applicable_on)
    }

    /// Build an expander; fails when a required table was not mined.
    pub fn create(
        &self,
        name: &str,
        context: &Arc<MinedContext>,
        dictionary: &Arc<Dictionary>,
    ) -> Result<Arc<dyn Expander>> {
        let entry = self.entry(name)?;
        for miner in entry.requires {
            context.require(miner, name)?;
        }
        (entry.factory)(context, dictionary)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ExpanderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(NOEXP, CONSERV, &[], |_, _| Ok(Arc::new(NoExpander)));
        registry.register(BASIC, GREEDY, &[DECLARATIONS], |context, _| {
            Ok(Arc::new(BasicExpander::new(Arc::clone(context))))
        });
        registry.register(AMAP, SAMURAI, &[SCOPES], |context, _| {
            Ok(Arc::new(AmapExpander::new(Arc::clone(context))))
        });
        registry
    }
}

impl std::fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpanderRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Applies every configured expander whose splitter ran on the identifier.
#[derive(Clone, Default)]
pub struct ExpansionStage {
    expanders: Vec<Arc<dyn Expander>>,
}

impl ExpansionStage {
    pub fn new(expanders: Vec<Arc<dyn Expander>>) -> Self {
        Self { expanders }
    }

    pub fn apply(&self, identifier: &mut Identifier) {
        for expander in &self.expanders {
            if !identifier.splits.contains_key(expander.applicable_on()) {
                continue;
            }
            let expansions = expander.expand(identifier);
            if expansions.is_empty() {
                continue;
            }
            if identifier.expansions.contains_key(expander.name()) {
                warn!(
                    "Expander '{}' already recorded for {}",
                    expander.name(),
                    identifier.id
                );
                continue;
            }
            identifier
                .expansions
                .insert(expander.name().to_string(), expansions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DeclKind;
    use crate::lang::common::Position;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ranking_keeps_three_closest() {
        let ranked = handle_multiple_expansions(
            "cfg",
            strings(&["configuration", "config", "cfgs", "confirming", "cfg-file"]),
        );
        assert_eq!(ranked, strings(&["cfgs", "config", "cfg-file"]));
    }

    #[test]
    fn test_ranking_ties_keep_input_order() {
        let ranked = handle_multiple_expansions("ab", strings(&["abc", "abd", "abe", "abf"]));
        assert_eq!(ranked, strings(&["abc", "abd", "abe"]));
        assert_eq!(handle_multiple_expansions("ab", strings(&["x", "y"])), strings(&["x", "y"]));
    }

    #[test]
    fn test_lookup_falls_back_to_parent() {
        let mut table = AHashMap::new();
        table.insert("parent".to_string(), 7);
        let orphan = Identifier::new("local", "a.go", "a", "x", DeclKind::Var, Position::new(2, 2));
        assert_eq!(lookup_context(&table, &orphan), None);
        assert_eq!(lookup_context(&table, &orphan.clone().with_parent("parent")), Some(&7));
    }

    #[test]
    fn test_registry_rejects_missing_miner_and_unknown_name() {
        let registry = ExpanderRegistry::default();
        let context = Arc::new(MinedContext::new());
        let dictionary = Arc::new(Dictionary::embedded());

        assert!(registry.create(BASIC, &context, &dictionary).err().unwrap().is_configuration());
        assert!(registry.create(AMAP, &context, &dictionary).err().unwrap().is_configuration());
        assert!(registry.create(NOEXP, &context, &dictionary).is_ok());
        assert_eq!(
            registry.create("crystal", &context, &dictionary).err().unwrap().to_string(),
            "no factory for expander 'crystal'"
        );
        assert_eq!(registry.applicable_on(AMAP).unwrap(), SAMURAI);
        assert_eq!(registry.requires(BASIC).unwrap(), &[DECLARATIONS]);
    }

    #[test]
    fn test_stage_skips_expanders_without_their_split() {
        let stage = ExpansionStage::new(vec![Arc::new(NoExpander)]);
        let mut identifier = Identifier::new("id", "a.go", "a", "ctrlDel", DeclKind::Func, Position::new(1, 1));

        stage.apply(&mut identifier);
        assert!(identifier.expansions.is_empty());

        identifier.record_split(CONSERV, strings(&["ctrl", "del"]));
        stage.apply(&mut identifier);
        let expansions = &identifier.expansions[NOEXP];
        assert_eq!(expansions.len(), 2);
        assert_eq!(expansions[1].from, "del");
        assert_eq!(expansions[1].values, strings(&["del"]));
    }

    proptest! {
        #[test]
        fn prop_ranking_is_closest_first(
            token in "[a-z]{1,6}",
            candidates in proptest::collection::vec("[a-z-]{1,12}", 0..10),
        ) {
            let ranked = handle_multiple_expansions(&token, candidates.clone());
            prop_assert_eq!(ranked.len(), candidates.len().min(MAX_CANDIDATES));

            let distances: Vec<usize> = ranked
                .iter()
                .map(|c| edit_distance::edit_distance(&token, c))
                .collect();
            prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));

            let mut all: Vec<usize> = candidates
                .iter()
                .map(|c| edit_distance::edit_distance(&token, c))
                .collect();
            all.sort_unstable();
            prop_assert_eq!(distances, all.into_iter().take(MAX_CANDIDATES).collect::<Vec<_>>());
        }
    }
}
