//! Identifier extraction.
//!
//! One extractor walks one parsed file and emits an [`Identifier`] per
//! function, var, const, struct and interface, plus one per local binding of
//! a function body. Locals carry the enclosing function's canonical ID as
//! their parent. A canonical ID that repeats within a file (several `init`
//! functions) is emitted once; the miners merge the context of every
//! occurrence under that ID.

use ahash::AHashSet;
use tracing::warn;

use crate::core::addressing::CanonicalIdBuilder;
use crate::core::identifier::{DeclKind, Identifier};
use crate::core::source::SourceFile;
use crate::lang::common::{Decl, FuncDecl, GoFile, Position, TypeBody, TypeDecl, ValueDecl};

const BLANK: &str = "_";

pub struct IdentifierExtractor<'a> {
    file_name: &'a str,
    syntax: &'a GoFile,
    /// Canonical ID of the function being walked
    enclosing: Option<String>,
    seen: AHashSet<String>,
    identifiers: Vec<Identifier>,
}

impl<'a> IdentifierExtractor<'a> {
    /// `None` for files that did not parse.
    pub fn new(file: &'a SourceFile) -> Option<Self> {
        let syntax = file.syntax.as_deref()?;
        Some(Self {
            file_name: &file.name,
            syntax,
            enclosing: None,
            seen: AHashSet::new(),
            identifiers: Vec::new(),
        })
    }

    pub fn extract(mut self) -> Vec<Identifier> {
        let syntax = self.syntax;
        for decl in &syntax.decls {
            match decl {
                Decl::Func(func) => self.visit_func(func),
                Decl::Value(values) => self.visit_values(values),
                Decl::Type(types) => self.visit_types(types),
            }
        }
        self.identifiers
    }

    fn builder(&self, kind: DeclKind, name: &str) -> CanonicalIdBuilder {
        CanonicalIdBuilder::new()
            .filename(self.file_name)
            .package(&self.syntax.package)
            .decl_type(kind)
            .name(name)
    }

    fn emit(&mut self, id: String, name: &str, kind: DeclKind, position: Position) -> &mut Identifier {
        let identifier = Identifier::new(
            id,
            self.file_name,
            &self.syntax.package,
            name,
            kind,
            position,
        );
        self.identifiers.push(identifier);
        let last = self.identifiers.len() - 1;
        &mut self.identifiers[last]
    }

    /// Emit a top-level declaration unless its ID was already emitted.
    fn emit_top_level(&mut self, id: String, name: &str, kind: DeclKind, position: Position) {
        if !self.seen.insert(id.clone()) {
            warn!(
                "Duplicate canonical ID {} at {}:{}:{}; keeping the first declaration",
                id, self.file_name, position.line, position.column
            );
            return;
        }
        self.emit(id, name, kind, position);
    }

    fn visit_func(&mut self, func: &FuncDecl) {
        if func.name.name.is_empty() || func.name.name == BLANK {
            return;
        }
        let mut builder = self.builder(DeclKind::Func, &func.name.name);
        if let Some(receiver) = &func.receiver {
            builder = builder.receiver(&receiver.type_name);
        }
        let id = builder.build();
        self.emit_top_level(id.clone(), &func.name.name, DeclKind::Func, func.name.position);

        self.enclosing = Some(id);
        for local in func.body.locals.iter().filter(|local| local.name != BLANK) {
            let kind = DeclKind::from(local.kind);
            let local_id = self.builder(kind, &local.name).local(local.position).build();
            let parent = self.enclosing.clone().unwrap_or_default();
            self.emit(local_id, &local.name, kind, local.position).parent = parent;
        }
        self.enclosing = None;
    }

    fn visit_values(&mut self, decl: &ValueDecl) {
        let kind = DeclKind::from(decl.kind);
        for spec in &decl.specs {
            for ident in spec.names.iter().filter(|ident| ident.name != BLANK) {
                let id = self.builder(kind, &ident.name).build();
                self.emit_top_level(id, &ident.name, kind, ident.position);
            }
        }
    }

    fn visit_types(&mut self, decl: &TypeDecl) {
        for spec in &decl.specs {
            let kind = match spec.body {
                TypeBody::Struct(_) => DeclKind::Struct,
                TypeBody::Interface(_) => DeclKind::Interface,
                TypeBody::Other(_) => continue,
            };
            let id = self.builder(kind, &spec.name.name).build();
            self.emit_top_level(id, &spec.name.name, kind, spec.name.position);
        }
    }
}

/// Extract every identifier of a parsed file; unparsed files yield nothing.
pub fn extract_identifiers(file: &SourceFile) -> Vec<Identifier> {
    IdentifierExtractor::new(file)
        .map(IdentifierExtractor::extract)
        .unwrap_or_default()
}
