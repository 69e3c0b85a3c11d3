//! Scope-aware expansion over the samurai split.
//!
//! Candidates are searched in widening scopes: the declaration's own
//! `"name type"` descriptors, its body text, its own comments, the package
//! comments and finally every comment of its file. Within a scope an acronym match beats a prefix match,
//! which beats a dropped-letter match. The first scope producing anything
//! wins, with its candidates ordered by how often they occur.

use std::sync::Arc;

use ahash::AHashMap;

use super::basic::abbreviates;
use super::{build_expansions, lookup_context, Expander, AMAP};
use crate::core::identifier::{Expansion, Identifier};
use crate::mining::{MinedContext, ScopedDeclaration};
use crate::splitting::SAMURAI;
use crate::text::words;

pub struct AmapExpander {
    context: Arc<MinedContext>,
}

impl AmapExpander {
    pub fn new(context: Arc<MinedContext>) -> Self {
        Self { context }
    }
}

/// The searchable text of one declaration, split into scope levels.
struct Scope {
    /// `(name, type)` pairs
    descriptors: Vec<(String, String)>,
    levels: [Vec<Vec<String>>; 5],
}

fn segments(texts: &[String]) -> Vec<Vec<String>> {
    texts.iter().map(|text| words(text)).filter(|w| !w.is_empty()).collect()
}

impl Scope {
    fn new(scoped: Option<&ScopedDeclaration>, file_comments: &[String]) -> Self {
        let file_level = segments(file_comments);
        let Some(scoped) = scoped else {
            return Self {
                descriptors: Vec::new(),
                levels: [Vec::new(), Vec::new(), Vec::new(), Vec::new(), file_level],
            };
        };
        let descriptors = scoped
            .declarations
            .iter()
            .filter_map(|descriptor| {
                let (name, ty) = descriptor.split_once(' ')?;
                Some((name.to_string(), ty.to_string()))
            })
            .collect();
        Self {
            descriptors,
            levels: [
                segments(&scoped.declarations),
                segments(&scoped.body_text),
                segments(&scoped.comments),
                segments(&scoped.package_comments),
                file_level,
            ],
        }
    }

    fn candidates(&self, token: &str) -> Vec<String> {
        let token = token.to_lowercase();
        let typed: Vec<String> = self
            .descriptors
            .iter()
            .filter(|(name, ty)| *name == token && *ty != token && ty.chars().all(char::is_alphabetic))
            .map(|(_, ty)| ty.clone())
            .filter(|ty| ty != "unknown")
            .collect();
        if !typed.is_empty() {
            return by_frequency(typed);
        }

        for level in &self.levels {
            for pattern in [acronym_matches, prefix_matches, dropped_letter_matches] {
                let found = pattern(&token, level);
                if !found.is_empty() {
                    return by_frequency(found);
                }
            }
        }
        Vec::new()
    }
}

/// Windows of consecutive words whose initials spell the token.
fn acronym_matches(token: &str, segments: &[Vec<String>]) -> Vec<String> {
    let width = token.chars().count();
    if width < 2 {
        return Vec::new();
    }
    let letters: Vec<char> = token.chars().collect();
    segments
        .iter()
        .flat_map(|segment| segment.windows(width))
        .filter(|window| {
            window
                .iter()
                .zip(&letters)
                .all(|(word, letter)| word.starts_with(*letter))
        })
        .map(|window| window.join(" "))
        .collect()
}

fn prefix_matches(token: &str, segments: &[Vec<String>]) -> Vec<String> {
    if token.chars().count() < 2 {
        return Vec::new();
    }
    segments
        .iter()
        .flatten()
        .filter(|word| word.len() > token.len() && word.starts_with(token))
        .cloned()
        .collect()
}

fn dropped_letter_matches(token: &str, segments: &[Vec<String>]) -> Vec<String> {
    segments
        .iter()
        .flatten()
        .filter(|word| abbreviates(token, word))
        .cloned()
        .collect()
}

/// Distinct candidates, most frequent first, ties by first appearance.
fn by_frequency(found: Vec<String>) -> Vec<String> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for candidate in &found {
        let count = counts.entry(candidate.as_str()).or_insert(0);
        if *count == 0 {
            order.push(candidate.as_str());
        }
        *count += 1;
    }
    order.sort_by_key(|candidate| std::cmp::Reverse(counts[candidate]));
    order.into_iter().map(str::to_string).collect()
}

impl Expander for AmapExpander {
    fn name(&self) -> &'static str {
        AMAP
    }

    fn applicable_on(&self) -> &'static str {
        SAMURAI
    }

    fn expand(&self, identifier: &Identifier) -> Vec<Expansion> {
        let Some(tokens) = identifier.split_tokens(SAMURAI) else {
            return Vec::new();
        };
        let scoped = self
            .context
            .scopes()
            .and_then(|table| lookup_context(table, identifier));
        // the comments miner is optional; without it the widest level is empty
        let file_comments = self
            .context
            .comments()
            .and_then(|table| table.get(&identifier.file))
            .map_or(&[][..], Vec::as_slice);

        let scope = Scope::new(scoped, file_comments);
        build_expansions(SAMURAI, &tokens, |token| scope.candidates(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DeclKind;
    use crate::lang::common::Position;
    use crate::mining::{MinedTable, COMMENTS, SCOPES};

    fn scoped(id: &str) -> ScopedDeclaration {
        ScopedDeclaration {
            id: id.to_string(),
            name: "f".to_string(),
            kind: DeclKind::Func,
            declarations: Vec::new(),
            statements: Vec::new(),
            body_text: Vec::new(),
            comments: Vec::new(),
            package_comments: Vec::new(),
        }
    }

    fn expander(scopes: Vec<ScopedDeclaration>) -> AmapExpander {
        let table = scopes.into_iter().map(|s| (s.id.clone(), s)).collect();
        let mut context = MinedContext::new();
        context.insert(SCOPES, MinedTable::Scopes(table));
        AmapExpander::new(Arc::new(context))
    }

    fn identifier(id: &str, tokens: &[&str]) -> Identifier {
        let mut identifier = Identifier::new(id, "a.go", "a", tokens.concat(), DeclKind::Func, Position::new(1, 1));
        identifier.record_split(SAMURAI, tokens.iter().map(|s| s.to_string()).collect());
        identifier
    }

    #[test]
    fn test_acronym_from_comment() {
        let mut scope = scoped("f");
        scope.comments = vec!["string buffer".to_string()];
        let expansions = expander(vec![scope]).expand(&identifier("f", &["sb"]));
        assert_eq!(
            expansions,
            vec![Expansion {
                order: 1,
                splitting_algorithm: SAMURAI.to_string(),
                from: "sb".to_string(),
                values: vec!["string buffer".to_string()],
            }]
        );
    }

    #[test]
    fn test_descriptor_type_wins_over_text() {
        let mut scope = scoped("f");
        scope.declarations = vec!["req request".to_string(), "n int".to_string()];
        scope.comments = vec!["require the record".to_string()];
        let expansions = expander(vec![scope]).expand(&identifier("f", &["req", "n"]));
        assert_eq!(expansions[0].values, vec!["request"]);
        assert_eq!(expansions[1].values, vec!["int"]);
    }

    #[test]
    fn test_levels_and_patterns_in_order() {
        let mut scope = scoped("f");
        scope.body_text = vec!["connection refused by connection pool".to_string()];
        scope.comments = vec!["count the configured cluster nodes".to_string()];
        scope.package_comments = vec!["package level message".to_string()];
        let expansions = expander(vec![scope]).expand(&identifier("f", &["conn", "cfg", "msg", "xyz"]));

        // body text prefix match, repeated word counted once
        assert_eq!(expansions[0].values, vec!["connection"]);
        // comment dropped-letter match
        assert_eq!(expansions[1].values, vec!["configured"]);
        // package comment dropped-letter match
        assert_eq!(expansions[2].values, vec!["message"]);
        assert_eq!(expansions[3].values, vec!["xyz"]);
    }

    #[test]
    fn test_most_frequent_first() {
        let mut scope = scoped("f");
        scope.comments = vec![
            "the server state".to_string(),
            "the session state".to_string(),
            "session state again".to_string(),
        ];
        let expansions = expander(vec![scope]).expand(&identifier("f", &["ss"]));
        assert_eq!(expansions[0].values, vec!["session state", "server state"]);
    }

    #[test]
    fn test_missing_scope_and_parent_fallback() {
        let mut parent = scoped("parent");
        parent.comments = vec!["request handler".to_string()];
        let expander = expander(vec![parent]);

        let orphan = identifier("local", &["rh"]);
        assert_eq!(expander.expand(&orphan)[0].values, vec!["rh"]);

        let child = identifier("local", &["rh"]).with_parent("parent");
        assert_eq!(expander.expand(&child)[0].values, vec!["request handler"]);

        let unsplit = Identifier::new("parent", "a.go", "a", "rh", DeclKind::Func, Position::new(1, 1));
        assert!(expander.expand(&unsplit).is_empty());
    }

    #[test]
    fn test_file_comments_are_the_widest_level() {
        let mut scope = scoped("f");
        scope.comments = vec!["count the configured nodes".to_string()];
        let table = std::iter::once((scope.id.clone(), scope)).collect();
        let mut comments = AHashMap::new();
        comments.insert(
            "a.go".to_string(),
            vec!["the message log".to_string(), "count the configured nodes".to_string()],
        );
        let mut context = MinedContext::new();
        context.insert(SCOPES, MinedTable::Scopes(table));
        context.insert(COMMENTS, MinedTable::Comments(comments));
        let expander = AmapExpander::new(Arc::new(context));

        let expansions = expander.expand(&identifier("f", &["cfg", "msg"]));
        // own comments still come first
        assert_eq!(expansions[0].values, vec!["configured"]);
        assert_eq!(expansions[1].values, vec!["message"]);

        // an identifier without scope context still reaches its file comments
        let orphan = identifier("unknown", &["msg"]);
        assert_eq!(expander.expand(&orphan)[0].values, vec!["message"]);
    }
}
