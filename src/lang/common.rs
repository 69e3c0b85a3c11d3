//! Owned syntax model shared by every miner and the identifier extractor.
//!
//! A parsed Go file is lowered once into these types; later passes only ever
//! match on the closed [`Decl`] / [`TypeBody`] enums, so adding a declaration
//! shape is a compile error everywhere it is not handled.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 1-based line/column position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line (1-based)
    pub line: usize,
    /// Column (1-based)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range plus start/end positions of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// True when `other` lies entirely inside this span.
    pub fn encloses(&self, other: &Span) -> bool {
        other.start_byte >= self.start_byte && other.end_byte <= self.end_byte
    }
}

/// A run of adjacent comments with their markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    /// Cleaned text, one line per comment line
    pub text: String,
    pub span: Span,
}

/// Whether a value declaration is `var` or `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Var,
    Const,
}

/// Coarse classification of a type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Named type; holds the bare type name (package qualifier dropped)
    Named(String),
    Array,
    Struct,
    Func,
    Interface,
    Map,
    Channel,
    Unknown,
}

impl TypeExpr {
    /// Lower-cased label used in scope descriptors (`"name type"`).
    pub fn label(&self) -> String {
        match self {
            TypeExpr::Named(name) => name.to_lowercase(),
            TypeExpr::Array => "array".to_string(),
            TypeExpr::Struct => "struct".to_string(),
            TypeExpr::Func => "func".to_string(),
            TypeExpr::Interface => "interface".to_string(),
            TypeExpr::Map => "map".to_string(),
            TypeExpr::Channel => "channel".to_string(),
            TypeExpr::Unknown => "unknown".to_string(),
        }
    }
}

/// A named binding with its own position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub position: Position,
}

/// Parameter, result or struct field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Empty for unnamed parameters and embedded fields
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
}

impl Field {
    /// `"name type"` descriptors, one per name (just the type when unnamed).
    pub fn descriptors(&self) -> Vec<String> {
        let ty = self.ty.label();
        if self.names.is_empty() {
            return vec![ty];
        }
        self.names
            .iter()
            .map(|ident| format!("{} {}", ident.name.to_lowercase(), ty))
            .collect()
    }
}

/// Method receiver, resolved to the receiver's type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: Option<String>,
    pub type_name: String,
    pub pointer: bool,
}

/// Variable or constant declared inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBinding {
    pub name: String,
    pub kind: ValueKind,
    pub position: Position,
}

/// What a function body contributes to mining and extraction.
#[derive(Debug, Clone, Default)]
pub struct FuncBody {
    /// `var`/`const`/`:=` bindings in source order
    pub locals: Vec<LocalBinding>,
    /// Plain `=` assignment targets
    pub assigned: Vec<String>,
    /// `for k, v = range` targets; declaring clauses land in `locals`
    pub range_vars: Vec<String>,
    /// Contents of string literals (quotes removed)
    pub literals: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub doc: Option<CommentGroup>,
    pub span: Span,
    pub body: FuncBody,
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    /// String literal contents found in the value expressions
    pub literals: Vec<String>,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
    pub span: Span,
}

/// A `var` or `const` declaration, single or parenthesised.
#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub kind: ValueKind,
    pub grouped: bool,
    pub doc: Option<CommentGroup>,
    pub specs: Vec<ValueSpec>,
}

#[derive(Debug, Clone)]
pub struct InterfaceMethod {
    pub name: Ident,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone)]
pub enum TypeBody {
    Struct(Vec<Field>),
    Interface(Vec<InterfaceMethod>),
    Other(TypeExpr),
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
    pub span: Span,
    pub body: TypeBody,
}

/// A `type` declaration, single or parenthesised.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub grouped: bool,
    pub doc: Option<CommentGroup>,
    pub specs: Vec<TypeSpec>,
}

/// Top-level declaration of a Go file.
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Value(ValueDecl),
    Type(TypeDecl),
}

/// Lowered view of one Go source file.
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    pub package: String,
    pub package_doc: Option<CommentGroup>,
    /// Every comment group in source order
    pub comments: Vec<CommentGroup>,
    pub decls: Vec<Decl>,
}

impl GoFile {
    /// Comment groups lexically inside `span`, excluding `doc` itself.
    pub fn comments_within<'a>(
        &'a self,
        span: &'a Span,
    ) -> impl Iterator<Item = &'a CommentGroup> + 'a {
        self.comments
            .iter()
            .filter(move |group| span.encloses(&group.span))
    }

    /// Cleaned package comment lines.
    pub fn package_comments(&self) -> Vec<String> {
        self.package_doc
            .iter()
            .map(|group| group.text.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_descriptors() {
        let field = Field {
            names: vec![
                Ident {
                    name: "Src".to_string(),
                    position: Position::new(1, 1),
                },
                Ident {
                    name: "dst".to_string(),
                    position: Position::new(1, 6),
                },
            ],
            ty: TypeExpr::Named("Buffer".to_string()),
            doc: None,
            comment: None,
        };
        assert_eq!(field.descriptors(), vec!["src buffer", "dst buffer"]);

        let unnamed = Field {
            names: Vec::new(),
            ty: TypeExpr::Map,
            doc: None,
            comment: None,
        };
        assert_eq!(unnamed.descriptors(), vec!["map"]);
    }

    #[test]
    fn test_span_encloses() {
        let outer = Span {
            start_byte: 10,
            end_byte: 100,
            ..Span::default()
        };
        let inner = Span {
            start_byte: 20,
            end_byte: 30,
            ..Span::default()
        };
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(12, 5).to_string(), "12:5");
    }
}
