//! Frequency-driven splitting after Enslen et al., "Mining source code to
//! automatically split identifiers" (MSR 2009).
//!
//! A substring's score is its count in the identifier's own file plus its
//! corpus count damped by the corpus size. A same-case token is cut where both
//! halves score clearly better than the token as a whole.

use std::sync::Arc;

use ahash::AHashMap;

use super::{Splitter, SAMURAI};
use crate::core::errors::{NomenError, Result};
use crate::core::identifier::Identifier;
use crate::mining::{FrequencyTable, MinedContext, GLOBAL_FREQUENCY, LOCAL_FREQUENCY};
use crate::text::split_identifier_lower;

const COMMON_PREFIXES: &[&str] = &[
    "anti", "auto", "bi", "co", "de", "dis", "en", "ex", "im", "in", "inter", "ir", "mis", "non",
    "over", "post", "pre", "pro", "re", "semi", "sub", "super", "trans", "un", "under",
];

const COMMON_SUFFIXES: &[&str] = &[
    "able", "al", "ed", "er", "es", "est", "ful", "ible", "ing", "ion", "ity", "ive", "less", "ly",
    "ment", "ness", "ous", "s", "tion",
];

pub struct SamuraiSplitter {
    global: FrequencyTable,
    local: AHashMap<String, FrequencyTable>,
    damping: f64,
}

impl SamuraiSplitter {
    pub fn new(global: FrequencyTable, local: AHashMap<String, FrequencyTable>) -> Self {
        let damping = (global.total() as f64).log10().max(1.0);
        Self {
            global,
            local,
            damping,
        }
    }

    pub fn from_context(context: &MinedContext) -> Result<Self> {
        context.require(GLOBAL_FREQUENCY, SAMURAI)?;
        context.require(LOCAL_FREQUENCY, SAMURAI)?;
        match (context.global_frequency(), context.local_frequency()) {
            (Some(global), Some(local)) => Ok(Self::new(global.clone(), local.clone())),
            _ => Err(NomenError::internal(
                "frequency miners published tables of the wrong shape",
            )),
        }
    }

    fn score(&self, token: &str, local: Option<&FrequencyTable>) -> f64 {
        let local_count = local.map_or(0, |table| table.count(token)) as f64;
        local_count + self.global.count(token) as f64 / self.damping
    }

    fn is_affix(left: &str, right: &str) -> bool {
        COMMON_PREFIXES.contains(&left) || COMMON_SUFFIXES.contains(&right)
    }

    /// Best split of `chars[start..]` with its summed part score, or the
    /// suffix alone with a score of negative infinity. `unsplit_score` is the
    /// score of the outermost token; `memo` caches one result per suffix.
    fn split_suffix(
        &self,
        chars: &[char],
        start: usize,
        unsplit_score: f64,
        local: Option<&FrequencyTable>,
        memo: &mut [Option<(Vec<String>, f64)>],
    ) -> (Vec<String>, f64) {
        if let Some(cached) = &memo[start] {
            return cached.clone();
        }

        let token: String = chars[start..].iter().collect();
        let threshold = self.score(&token, local).max(unsplit_score);
        let mut best = (vec![token], f64::NEG_INFINITY);

        for cut in start + 1..chars.len() {
            let left: String = chars[start..cut].iter().collect();
            let right: String = chars[cut..].iter().collect();
            if Self::is_affix(&left, &right) {
                continue;
            }

            let left_score = self.score(&left, local);
            if left_score.sqrt() <= threshold {
                continue;
            }
            let right_score = self.score(&right, local);

            if right_score.sqrt() > threshold {
                if left_score + right_score > best.1 {
                    best = (vec![left, right], left_score + right_score);
                }
            } else {
                let (rest, rest_score) = self.split_suffix(chars, cut, unsplit_score, local, memo);
                if rest.len() > 1 && left_score + rest_score > best.1 {
                    best = (
                        std::iter::once(left).chain(rest).collect(),
                        left_score + rest_score,
                    );
                }
            }
        }

        memo[start] = Some(best.clone());
        best
    }

    /// Split one lower-case token.
    fn same_case_split(&self, token: &str, local: Option<&FrequencyTable>) -> Vec<String> {
        let chars: Vec<char> = token.chars().collect();
        let unsplit_score = self.score(token, local);
        let mut memo = vec![None; chars.len()];
        self.split_suffix(&chars, 0, unsplit_score, local, &mut memo).0
    }
}

impl Splitter for SamuraiSplitter {
    fn name(&self) -> &'static str {
        SAMURAI
    }

    fn split(&self, identifier: &Identifier) -> Vec<String> {
        let local = self.local.get(&identifier.file);
        split_identifier_lower(&identifier.name)
            .into_iter()
            .flat_map(|token| {
                if token.chars().count() < 2 || !token.chars().all(char::is_alphabetic) {
                    return vec![token];
                }
                self.same_case_split(&token, local)
            })
            .collect()
    }
}
