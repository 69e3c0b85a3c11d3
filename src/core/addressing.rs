//! Canonical addressing of declarations.
//!
//! Every stage joins on the string produced here:
//!
//! ```text
//! filename:<f>+++pkg:<p>+++declType:<t>+++name:<n>
//! filename:<f>+++pkg:<p>+++declType:<t>+++name:<receiver>.<n>
//! ...+++local:<line>:<column>
//! ```
//!
//! Two builders exist. [`CanonicalIdBuilder`] takes raw fields and is used by
//! the extractor and the declaration miner; [`ScopeIdBuilder`] resolves the
//! same fields from the syntax model for the scope miner. Both funnel into
//! [`compose`], and they must agree byte for byte.

use crate::core::identifier::DeclKind;
use crate::lang::common::{FuncDecl, Position, TypeBody, TypeSpec, ValueKind};

const SEPARATOR: &str = "+++";

fn compose(
    filename: &str,
    package: &str,
    decl_type: &str,
    name: &str,
    receiver: Option<&str>,
    local: Option<Position>,
) -> String {
    let qualified = match receiver {
        Some(receiver) if !receiver.is_empty() => format!("{receiver}.{name}"),
        _ => name.to_string(),
    };
    let mut id = format!(
        "filename:{filename}{SEPARATOR}pkg:{package}{SEPARATOR}declType:{decl_type}{SEPARATOR}name:{qualified}"
    );
    if let Some(position) = local {
        id.push_str(SEPARATOR);
        id.push_str("local:");
        id.push_str(&position.to_string());
    }
    id
}

/// Fluent builder over raw declaration fields.
#[derive(Debug, Clone, Default)]
pub struct CanonicalIdBuilder {
    filename: String,
    package: String,
    decl_type: String,
    name: String,
    receiver: Option<String>,
    local: Option<Position>,
}

impl CanonicalIdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn decl_type(mut self, kind: DeclKind) -> Self {
        self.decl_type = kind.as_str().to_string();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Mark the identifier as local to an enclosing declaration.
    pub fn local(mut self, position: Position) -> Self {
        self.local = Some(position);
        self
    }

    pub fn build(&self) -> String {
        compose(
            &self.filename,
            &self.package,
            &self.decl_type,
            &self.name,
            self.receiver.as_deref(),
            self.local,
        )
    }
}

/// Builder that derives the address from syntax-model declarations.
#[derive(Debug, Clone)]
pub struct ScopeIdBuilder {
    filename: String,
    package: String,
    kind: Option<DeclKind>,
    name: String,
    receiver_type: Option<String>,
}

impl ScopeIdBuilder {
    /// Start addressing declarations of one file.
    pub fn for_file(filename: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            package: package.into(),
            kind: None,
            name: String::new(),
            receiver_type: None,
        }
    }

    /// Address a function; methods resolve their receiver type (value or pointer).
    pub fn func(mut self, func: &FuncDecl) -> Self {
        self.kind = Some(DeclKind::Func);
        self.name = func.name.name.clone();
        self.receiver_type = func.receiver.as_ref().map(|r| r.type_name.clone());
        self
    }

    /// Address one name of a `var`/`const` spec.
    pub fn value(mut self, kind: ValueKind, name: impl Into<String>) -> Self {
        self.kind = Some(DeclKind::from(kind));
        self.name = name.into();
        self.receiver_type = None;
        self
    }

    /// Address a struct or interface type spec; other type specs have no kind.
    pub fn type_spec(mut self, spec: &TypeSpec) -> Self {
        self.kind = match spec.body {
            TypeBody::Struct(_) => Some(DeclKind::Struct),
            TypeBody::Interface(_) => Some(DeclKind::Interface),
            TypeBody::Other(_) => None,
        };
        self.name = spec.name.name.clone();
        self.receiver_type = None;
        self
    }

    pub fn kind(&self) -> Option<DeclKind> {
        self.kind
    }

    pub fn build(&self) -> String {
        compose(
            &self.filename,
            &self.package,
            self.kind.map(DeclKind::as_str).unwrap_or_default(),
            &self.name,
            self.receiver_type.as_deref(),
            None,
        )
    }
}
