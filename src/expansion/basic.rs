//! Dictionary and phrase expansion over the greedy split.
//!
//! The mined declaration supplies a word set and a phrase map keyed by
//! initials (`"string buffer"` under `"sb"`, stored as `"string-buffer"`).
//! A token that is a mined word stays as it is; otherwise its candidates are
//! the phrases filed under it plus every mined word it abbreviates.

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashMap;

use super::{build_expansions, handle_multiple_expansions, lookup_context, Expander, BASIC};
use crate::core::identifier::{Expansion, Identifier};
use crate::mining::{MinedContext, MinedDeclaration};
use crate::splitting::GREEDY;
use crate::text::initials;

pub struct BasicExpander {
    context: Arc<MinedContext>,
}

impl BasicExpander {
    pub fn new(context: Arc<MinedContext>) -> Self {
        Self { context }
    }
}

/// True when `token` could be a shortening of `word`: same first letter and
/// every letter of `token` appears in `word` in order.
pub fn abbreviates(token: &str, word: &str) -> bool {
    if token.chars().count() < 2 || token.len() >= word.len() {
        return false;
    }
    let mut token_chars = token.chars();
    let mut word_chars = word.chars();
    if token_chars.next() != word_chars.next() {
        return false;
    }
    token_chars.all(|t| word_chars.any(|w| w == t))
}

struct WordContext<'a> {
    words: &'a BTreeSet<String>,
    phrases: AHashMap<String, Vec<String>>,
}

impl<'a> WordContext<'a> {
    fn new(mined: &'a MinedDeclaration) -> Self {
        let mut phrases: AHashMap<String, Vec<String>> = AHashMap::new();
        for phrase in &mined.phrases {
            phrases
                .entry(initials(phrase))
                .or_default()
                .push(phrase.replace(' ', "-"));
        }
        Self {
            words: &mined.words,
            phrases,
        }
    }

    fn candidates(&self, token: &str) -> Vec<String> {
        if self.words.contains(token) {
            return vec![token.to_string()];
        }
        let mut candidates: Vec<String> = self.phrases.get(token).cloned().unwrap_or_default();
        for word in self.words.iter().filter(|word| abbreviates(token, word)) {
            if !candidates.contains(word) {
                candidates.push(word.clone());
            }
        }
        candidates
    }
}

impl Expander for BasicExpander {
    fn name(&self) -> &'static str {
        BASIC
    }

    fn applicable_on(&self) -> &'static str {
        GREEDY
    }

    fn expand(&self, identifier: &Identifier) -> Vec<Expansion> {
        let Some(tokens) = identifier.split_tokens(GREEDY) else {
            return Vec::new();
        };
        let mined = self
            .context
            .declarations()
            .and_then(|table| lookup_context(table, identifier));
        let Some(mined) = mined else {
            return build_expansions(GREEDY, &tokens, |_| Vec::new());
        };

        let words = WordContext::new(mined);
        build_expansions(GREEDY, &tokens, |token| {
            let candidates = words.candidates(token);
            match candidates.len() {
                0 | 1 => candidates,
                _ => handle_multiple_expansions(token, candidates),
            }
        })
    }
}
