//! Dictionary-driven greedy splitting.
//!
//! Each conservative token that is not itself a known word is decomposed
//! twice, once taking the longest known prefix repeatedly and once taking the
//! longest known suffix. The decomposition covering more characters with
//! known words wins; ties go to the one with fewer parts, then to the prefix
//! pass.

use std::sync::Arc;

use super::{Splitter, GREEDY};
use crate::core::identifier::Identifier;
use crate::text::dictionary::is_known_abbreviation;
use crate::text::{split_identifier_lower, Dictionary};

const MIN_WORD_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct GreedySplitter {
    dictionary: Arc<Dictionary>,
}

impl GreedySplitter {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    fn is_known(&self, word: &str) -> bool {
        word.chars().count() >= MIN_WORD_LEN
            && (self.dictionary.contains(word) || is_known_abbreviation(word))
    }

    fn prefix_split(&self, chars: &[char]) -> Vec<String> {
        let mut parts = Vec::new();
        let mut unknown = String::new();
        let mut start = 0;

        while start < chars.len() {
            let matched = (start + MIN_WORD_LEN..=chars.len())
                .rev()
                .map(|end| (end, chars[start..end].iter().collect::<String>()))
                .find(|(_, candidate)| self.is_known(candidate));
            match matched {
                Some((end, word)) => {
                    if !unknown.is_empty() {
                        parts.push(std::mem::take(&mut unknown));
                    }
                    parts.push(word);
                    start = end;
                }
                None => {
                    unknown.push(chars[start]);
                    start += 1;
                }
            }
        }
        if !unknown.is_empty() {
            parts.push(unknown);
        }
        parts
    }

    fn suffix_split(&self, chars: &[char]) -> Vec<String> {
        let mut parts = Vec::new();
        let mut unknown: Vec<char> = Vec::new();
        let mut end = chars.len();

        while end > 0 {
            let matched = (0..=end.saturating_sub(MIN_WORD_LEN))
                .map(|start| (start, chars[start..end].iter().collect::<String>()))
                .find(|(_, candidate)| self.is_known(candidate));
            match matched {
                Some((start, word)) => {
                    if !unknown.is_empty() {
                        parts.push(unknown.drain(..).rev().collect());
                    }
                    parts.push(word);
                    end = start;
                }
                None => {
                    unknown.push(chars[end - 1]);
                    end -= 1;
                }
            }
        }
        if !unknown.is_empty() {
            parts.push(unknown.into_iter().rev().collect());
        }
        parts.reverse();
        parts
    }

    fn coverage(&self, parts: &[String]) -> usize {
        parts
            .iter()
            .filter(|part| self.is_known(part))
            .map(|part| part.chars().count())
            .sum()
    }

    fn split_token(&self, token: String) -> Vec<String> {
        if self.is_known(&token) || !token.chars().all(char::is_alphabetic) {
            return vec![token];
        }
        let chars: Vec<char> = token.chars().collect();
        let prefix = self.prefix_split(&chars);
        let suffix = self.suffix_split(&chars);

        let prefix_key = (self.coverage(&prefix), std::cmp::Reverse(prefix.len()));
        let suffix_key = (self.coverage(&suffix), std::cmp::Reverse(suffix.len()));
        if suffix_key > prefix_key {
            suffix
        } else {
            prefix
        }
    }
}

impl Splitter for GreedySplitter {
    fn name(&self) -> &'static str {
        GREEDY
    }

    fn split(&self, identifier: &Identifier) -> Vec<String> {
        split_identifier_lower(&identifier.name)
            .into_iter()
            .flat_map(|token| self.split_token(token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DeclKind;
    use crate::lang::common::Position;

    fn split(name: &str) -> Vec<String> {
        let splitter = GreedySplitter::new(Arc::new(Dictionary::embedded()));
        splitter.split(&Identifier::new(
            "id",
            "a.go",
            "a",
            name,
            DeclKind::Var,
            Position::new(1, 1),
        ))
    }

    #[test]
    fn test_known_tokens_stay_whole() {
        assert_eq!(split("str"), vec!["str"]);
        assert_eq!(split("maxCount"), vec!["max", "count"]);
        assert_eq!(split("v2"), vec!["v", "2"]);
    }

    #[test]
    fn test_same_case_words_are_separated() {
        assert_eq!(split("userlist"), vec!["user", "list"]);
        assert_eq!(split("strlen"), vec!["str", "len"]);
        assert_eq!(split("getFilename"), vec!["get", "filename"]);
    }

    #[test]
    fn test_suffix_pass_wins_on_coverage() {
        // prefix: sb + uf, suffix: s + buf
        assert_eq!(split("sbuf"), vec!["s", "buf"]);
    }
}
