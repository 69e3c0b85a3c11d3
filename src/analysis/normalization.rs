//! Picks one rewrite per identifier out of all (splitter, expander) chains.

use std::sync::Arc;

use crate::core::identifier::{Expansion, Identifier, Normalization};
use crate::text::{camel_join, split_identifier_lower, Dictionary};

/// Confidence heuristic for one (splitter, expander) chain.
pub trait ScoreStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score in `[0.0, 1.0]` for `word`, reconstructed from `chain`.
    /// `chain` is empty when a bare word is scored.
    fn score(&self, word: &str, chain: &[Expansion]) -> f64;
}

/// Share of the chain's characters that are either kept unchanged or belong
/// to dictionary words.
#[derive(Debug, Clone)]
pub struct DictionaryCoverage {
    dictionary: Arc<Dictionary>,
}

impl DictionaryCoverage {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    /// (covered, total) characters of a word's dictionary coverage.
    fn coverage(&self, text: &str) -> (usize, usize) {
        split_identifier_lower(text)
            .into_iter()
            .fold((0, 0), |(covered, total), part| {
                let len = part.chars().count();
                if self.dictionary.contains(&part) {
                    (covered + len, total + len)
                } else {
                    (covered, total + len)
                }
            })
    }
}

impl ScoreStrategy for DictionaryCoverage {
    fn name(&self) -> &'static str {
        "dictionary_coverage"
    }

    fn score(&self, word: &str, chain: &[Expansion]) -> f64 {
        let (covered, total) = if chain.is_empty() {
            self.coverage(word)
        } else {
            chain
                .iter()
                .filter_map(|expansion| {
                    let value = expansion.values.first()?;
                    if value.eq_ignore_ascii_case(&expansion.from) {
                        let len = value.chars().count();
                        Some((len, len))
                    } else {
                        Some(self.coverage(value))
                    }
                })
                .fold((0, 0), |(c, t), (sc, st)| (c + sc, t + st))
        };
        if total == 0 {
            0.0
        } else {
            covered as f64 / total as f64
        }
    }
}

/// Rebuild the candidate word of one chain: the first value of every
/// segment, in split order, joined as camelCase.
pub fn reconstruct_word(expansions: &[Expansion]) -> String {
    let mut ordered: Vec<&Expansion> = expansions.iter().collect();
    ordered.sort_by_key(|expansion| expansion.order);

    let words = ordered
        .into_iter()
        .filter_map(|expansion| expansion.values.first())
        .flat_map(|value| {
            value
                .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
    camel_join(words)
}

#[derive(Clone)]
pub struct Normalizer {
    strategy: Arc<dyn ScoreStrategy>,
}

impl Normalizer {
    pub fn new(strategy: Arc<dyn ScoreStrategy>) -> Self {
        Self { strategy }
    }

    pub fn with_dictionary(dictionary: Arc<Dictionary>) -> Self {
        Self::new(Arc::new(DictionaryCoverage::new(dictionary)))
    }

    /// Best-scoring chain; on equal scores the first chain in expander order stays.
    pub fn normalize(&self, identifier: &Identifier) -> Normalization {
        let mut best: Option<Normalization> = None;

        for (expander, expansions) in &identifier.expansions {
            let Some(first) = expansions.first() else {
                continue;
            };
            let word = reconstruct_word(expansions);
            let score = self.strategy.score(&word, expansions);
            if best.as_ref().is_some_and(|b| score <= b.score) {
                continue;
            }
            best = Some(Normalization {
                word,
                algorithm: format!("{}+{}", first.splitting_algorithm, expander),
                score,
            });
        }

        best.unwrap_or_else(Normalization::undefined)
    }

    pub fn apply(&self, identifier: &mut Identifier) {
        identifier.normalization = self.normalize(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DeclKind;
    use crate::lang::common::Position;
    use approx::assert_relative_eq;

    fn expansion(order: usize, splitter: &str, from: &str, values: &[&str]) -> Expansion {
        Expansion {
            order,
            splitting_algorithm: splitter.to_string(),
            from: from.to_string(),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn identifier(name: &str) -> Identifier {
        Identifier::new("id", "a.go", "a", name, DeclKind::Func, Position::new(1, 1))
    }

    fn normalizer() -> Normalizer {
        Normalizer::with_dictionary(Arc::new(Dictionary::embedded()))
    }

    #[test]
    fn test_coverage_score() {
        let strategy = DictionaryCoverage::new(Arc::new(Dictionary::embedded()));
        assert_relative_eq!(strategy.score("delete", &[]), 1.0);
        assert_relative_eq!(strategy.score("stringBuffer", &[]), 1.0);
        assert_relative_eq!(strategy.score("strBuffer", &[]), 6.0 / 9.0);
        assert_relative_eq!(strategy.score("", &[]), 0.0);
    }

    #[test]
    fn test_chain_coverage_counts_unchanged_tokens() {
        let strategy = DictionaryCoverage::new(Arc::new(Dictionary::embedded()));
        let kept = vec![expansion(1, "conserv", "ctx", &["ctx"])];
        assert_relative_eq!(strategy.score("ctx", &kept), 1.0);

        // "zzq" is neither kept nor a dictionary word
        let rewritten = vec![
            expansion(1, "greedy", "str", &["string"]),
            expansion(2, "greedy", "bf", &["zzq"]),
        ];
        assert_relative_eq!(strategy.score("stringZzq", &rewritten), 6.0 / 9.0);
    }

    #[test]
    fn test_identity_of_abbreviation_scores_one() {
        for name in ["ctx", "str", "wg"] {
            let mut id = identifier(name);
            id.expansions.insert(
                "noexp".to_string(),
                vec![expansion(1, "conserv", name, &[name])],
            );
            let normalization = normalizer().normalize(&id);
            assert_eq!(normalization.word, name);
            assert_relative_eq!(normalization.score, 1.0);
            assert!(!normalization.is_undefined());
        }
    }

    #[test]
    fn test_reconstruct_word_uses_first_values_in_order() {
        let chain = vec![
            expansion(2, "greedy", "buf", &["buffer", "buff"]),
            expansion(1, "greedy", "sb", &["string-buffer"]),
        ];
        assert_eq!(reconstruct_word(&chain), "stringBufferBuffer");
        assert_eq!(
            reconstruct_word(&[expansion(1, "samurai", "sb", &["string buffer"])]),
            "stringBuffer"
        );
    }

    #[test]
    fn test_identity_chain_scores_one() {
        let mut id = identifier("delete");
        id.expansions.insert(
            "custom_test".to_string(),
            vec![expansion(1, "split_test", "delete", &["delete"])],
        );
        let normalization = normalizer().normalize(&id);
        assert_eq!(normalization.word, "delete");
        assert_eq!(normalization.algorithm, "split_test+custom_test");
        assert_relative_eq!(normalization.score, 1.0);
    }

    #[test]
    fn test_no_chain_is_undefined() {
        let normalization = normalizer().normalize(&identifier("x"));
        assert_eq!(normalization, Normalization::undefined());
    }

    #[test]
    fn test_higher_score_wins_and_ties_are_stable() {
        let mut id = identifier("strBuf");
        id.expansions.insert(
            "noexp".to_string(),
            vec![
                expansion(1, "conserv", "str", &["str"]),
                expansion(2, "conserv", "buf", &["buf"]),
            ],
        );
        id.expansions.insert(
            "basic".to_string(),
            vec![
                expansion(1, "greedy", "str", &["string"]),
                expansion(2, "greedy", "buf", &["buffer"]),
            ],
        );
        let normalization = normalizer().normalize(&id);
        assert_eq!(normalization.word, "stringBuffer");
        assert_eq!(normalization.algorithm, "greedy+basic");

        let mut tied = identifier("delete");
        for expander in ["zeta", "alpha"] {
            tied.expansions.insert(
                expander.to_string(),
                vec![expansion(1, "conserv", "delete", &["delete"])],
            );
        }
        for _ in 0..3 {
            assert_eq!(normalizer().normalize(&tied).algorithm, "conserv+alpha");
        }
    }

    #[test]
    fn test_apply_writes_normalization() {
        let mut id = identifier("delete");
        id.expansions.insert(
            "noexp".to_string(),
            vec![expansion(1, "conserv", "delete", &["delete"])],
        );
        normalizer().apply(&mut id);
        assert_eq!(id.normalization.word, "delete");
    }
}
