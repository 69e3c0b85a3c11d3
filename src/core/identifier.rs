//! The identifier record that flows through split, expand and normalize.
//!
//! Each stage only adds entries to its own map (`splits`, `expansions`) or
//! fills `normalization`; no stage rewrites another stage's output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::common::{Position, ValueKind};

/// Declaration kind as written into canonical IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeclKind {
    Func,
    Var,
    Const,
    Struct,
    Interface,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Func => "FUNC",
            DeclKind::Var => "VAR",
            DeclKind::Const => "CONST",
            DeclKind::Struct => "STRUCT",
            DeclKind::Interface => "INTERFACE",
        }
    }
}

impl From<ValueKind> for DeclKind {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Var => DeclKind::Var,
            ValueKind::Const => DeclKind::Const,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One token produced by a splitter; `order` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub order: usize,
    pub value: String,
}

/// Expansion candidates for one split token, closest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub order: usize,
    pub splitting_algorithm: String,
    pub from: String,
    pub values: Vec<String>,
}

/// The recommended rewrite of an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub word: String,
    /// `"<splitter>+<expander>"` of the winning chain
    pub algorithm: String,
    pub score: f64,
}

impl Normalization {
    pub const UNDEFINED: &'static str = "undefined";

    /// Result for an identifier without any expansion chain.
    pub fn undefined() -> Self {
        Self {
            word: Self::UNDEFINED.to_string(),
            algorithm: Self::UNDEFINED.to_string(),
            score: 0.0,
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.algorithm == Self::UNDEFINED
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::undefined()
    }
}

/// An addressable declaration and everything later stages learn about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    /// Canonical ID
    pub id: String,
    pub file: String,
    pub package: String,
    pub position: Position,
    pub name: String,
    pub kind: DeclKind,
    /// Canonical ID of the enclosing declaration, empty at top level
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub splits: BTreeMap<String, Vec<Split>>,
    #[serde(default)]
    pub expansions: BTreeMap<String, Vec<Expansion>>,
    #[serde(default)]
    pub normalization: Normalization,
}

impl Identifier {
    pub fn new(
        id: impl Into<String>,
        file: impl Into<String>,
        package: impl Into<String>,
        name: impl Into<String>,
        kind: DeclKind,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            package: package.into(),
            position,
            name: name.into(),
            kind,
            parent: String::new(),
            splits: BTreeMap::new(),
            expansions: BTreeMap::new(),
            normalization: Normalization::undefined(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn has_parent(&self) -> bool {
        !self.parent.is_empty()
    }

    /// Go exports names that start with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    /// Tokens recorded by `splitter`, in split order.
    pub fn split_tokens(&self, splitter: &str) -> Option<Vec<String>> {
        self.splits.get(splitter).map(|splits| {
            let mut ordered: Vec<&Split> = splits.iter().collect();
            ordered.sort_by_key(|split| split.order);
            ordered.into_iter().map(|split| split.value.clone()).collect()
        })
    }

    /// Record a splitter's tokens, numbering them from 1.
    pub fn record_split(&mut self, splitter: &str, tokens: Vec<String>) {
        let splits = tokens
            .into_iter()
            .enumerate()
            .map(|(index, value)| Split {
                order: index + 1,
                value,
            })
            .collect();
        self.splits.insert(splitter.to_string(), splits);
    }
}
