//! Raw contextual fragments per declaration, consumed by scope-aware expansion.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MinedTable, Miner, SCOPES};
use crate::core::addressing::ScopeIdBuilder;
use crate::core::identifier::DeclKind;
use crate::core::source::SourceFile;
use crate::lang::common::{CommentGroup, Decl, FuncDecl, GoFile, TypeBody, TypeDecl, ValueDecl};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedDeclaration {
    pub id: String,
    pub name: String,
    pub kind: DeclKind,
    /// `"name type"` descriptors of parameters, results, receiver and fields
    pub declarations: Vec<String>,
    /// Member and local names (interface methods, struct fields, body bindings)
    pub statements: Vec<String>,
    /// String literal contents
    pub body_text: Vec<String>,
    /// Doc, line and enclosed comments of the declaration
    pub comments: Vec<String>,
    pub package_comments: Vec<String>,
}

impl ScopedDeclaration {
    fn new(builder: &ScopeIdBuilder, name: &str, kind: DeclKind, file: &GoFile) -> Self {
        Self {
            id: builder.build(),
            name: name.to_string(),
            kind,
            declarations: Vec::new(),
            statements: Vec::new(),
            body_text: Vec::new(),
            comments: Vec::new(),
            package_comments: file.package_comments(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopesMiner {
    table: AHashMap<String, ScopedDeclaration>,
}

fn push_comments<'a>(
    target: &mut Vec<String>,
    groups: impl IntoIterator<Item = &'a Option<CommentGroup>>,
) {
    target.extend(groups.into_iter().flatten().map(|group| group.text.clone()));
}

impl ScopesMiner {
    fn store(&mut self, scope: ScopedDeclaration) {
        match self.table.get_mut(&scope.id) {
            // `init` and friends may repeat within a file
            Some(existing) => {
                debug!("Merging scope context of repeated declaration {}", scope.id);
                existing.declarations.extend(scope.declarations);
                existing.statements.extend(scope.statements);
                existing.body_text.extend(scope.body_text);
                existing.comments.extend(scope.comments);
            }
            None => {
                self.table.insert(scope.id.clone(), scope);
            }
        }
    }

    fn mine_func(&mut self, file: &SourceFile, syntax: &GoFile, func: &FuncDecl) {
        let builder = ScopeIdBuilder::for_file(&file.name, &syntax.package).func(func);
        let mut scope = ScopedDeclaration::new(&builder, &func.name.name, DeclKind::Func, syntax);

        if let Some(receiver) = &func.receiver {
            let type_label = receiver.type_name.to_lowercase();
            scope.declarations.push(match &receiver.name {
                Some(name) => format!("{} {}", name.to_lowercase(), type_label),
                None => type_label,
            });
        }
        for field in func.params.iter().chain(func.results.iter()) {
            scope.declarations.extend(field.descriptors());
        }

        let body = &func.body;
        scope
            .statements
            .extend(body.locals.iter().map(|local| local.name.clone()));
        scope.statements.extend(body.assigned.iter().cloned());
        scope.body_text.extend(body.literals.iter().cloned());

        push_comments(&mut scope.comments, [&func.doc]);
        scope.comments.extend(
            syntax
                .comments_within(&func.span)
                .map(|group| group.text.clone()),
        );
        self.store(scope);
    }

    fn mine_values(&mut self, file: &SourceFile, syntax: &GoFile, decl: &ValueDecl) {
        for spec in &decl.specs {
            for ident in spec.names.iter().filter(|ident| ident.name != "_") {
                let builder =
                    ScopeIdBuilder::for_file(&file.name, &syntax.package).value(decl.kind, &ident.name);
                let kind = DeclKind::from(decl.kind);
                let mut scope = ScopedDeclaration::new(&builder, &ident.name, kind, syntax);

                if let Some(ty) = &spec.ty {
                    scope
                        .declarations
                        .push(format!("{} {}", ident.name.to_lowercase(), ty.label()));
                }
                scope.body_text.extend(spec.literals.iter().cloned());
                push_comments(&mut scope.comments, [&decl.doc, &spec.doc, &spec.comment]);
                self.store(scope);
            }
        }
    }

    fn mine_types(&mut self, file: &SourceFile, syntax: &GoFile, decl: &TypeDecl) {
        for spec in &decl.specs {
            let builder = ScopeIdBuilder::for_file(&file.name, &syntax.package).type_spec(spec);
            let Some(kind) = builder.kind() else {
                continue;
            };
            let mut scope = ScopedDeclaration::new(&builder, &spec.name.name, kind, syntax);
            push_comments(&mut scope.comments, [&decl.doc, &spec.doc, &spec.comment]);

            match &spec.body {
                TypeBody::Struct(fields) => {
                    for field in fields {
                        scope.declarations.extend(field.descriptors());
                        scope
                            .statements
                            .extend(field.names.iter().map(|ident| ident.name.clone()));
                        push_comments(&mut scope.comments, [&field.doc, &field.comment]);
                    }
                }
                TypeBody::Interface(methods) => {
                    for method in methods {
                        scope.statements.push(method.name.name.clone());
                        push_comments(&mut scope.comments, [&method.doc, &method.comment]);
                    }
                }
                TypeBody::Other(_) => {}
            }
            self.store(scope);
        }
    }
}

impl Miner for ScopesMiner {
    fn name(&self) -> &'static str {
        SCOPES
    }

    fn consume(&mut self, file: &SourceFile) {
        let Some(syntax) = file.syntax.as_ref().map(Arc::clone) else {
            return;
        };
        for decl in &syntax.decls {
            match decl {
                Decl::Func(func) => self.mine_func(file, &syntax, func),
                Decl::Value(values) => self.mine_values(file, &syntax, values),
                Decl::Type(types) => self.mine_types(file, &syntax, types),
            }
        }
    }

    fn results(self: Box<Self>) -> MinedTable {
        MinedTable::Scopes(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::RawSource;
    use crate::lang::go::GoParser;

    fn mine(name: &str, source: &str) -> AHashMap<String, ScopedDeclaration> {
        let mut parser = GoParser::new().unwrap();
        let file = SourceFile::parse(RawSource::new(name, source), &mut parser);
        let mut miner = Box::new(ScopesMiner::default());
        miner.consume(&file);
        match miner.results() {
            MinedTable::Scopes(table) => table,
            other => panic!("unexpected table {other:?}"),
        }
    }

    #[test]
    fn test_method_scope_fragments() {
        let table = mine(
            "io/buf.go",
            "// Package bufio wraps readers\npackage bufio\n\n// Fill reads into the string buffer\nfunc (b *Reader) Fill(sb []byte, n int) (err error) {\n\tmsg := \"read failed\"\n\t// retry once\n\t_ = msg\n}\n",
        );
        let scope = &table["filename:io/buf.go+++pkg:bufio+++declType:FUNC+++name:Reader.Fill"];
        assert_eq!(scope.name, "Fill");
        assert_eq!(
            scope.declarations,
            vec!["b reader", "sb array", "n int", "err error"]
        );
        assert_eq!(scope.body_text, vec!["read failed"]);
        assert_eq!(
            scope.comments,
            vec!["Fill reads into the string buffer", "retry once"]
        );
        assert_eq!(scope.package_comments, vec!["Package bufio wraps readers"]);
        assert!(scope.statements.contains(&"msg".to_string()));
    }

    #[test]
    fn test_value_and_type_scopes() {
        let table = mine(
            "a.go",
            "package a\n\nvar limit int = 10 // request limit\n\ntype Store interface {\n\tGet(key string) string\n}\n\ntype pair struct {\n\tkey, val string\n}\n",
        );
        let limit = &table["filename:a.go+++pkg:a+++declType:VAR+++name:limit"];
        assert_eq!(limit.declarations, vec!["limit int"]);
        assert_eq!(limit.comments, vec!["request limit"]);

        let store = &table["filename:a.go+++pkg:a+++declType:INTERFACE+++name:Store"];
        assert_eq!(store.statements, vec!["Get"]);

        let pair = &table["filename:a.go+++pkg:a+++declType:STRUCT+++name:pair"];
        assert_eq!(pair.declarations, vec!["key string", "val string"]);
        assert_eq!(pair.statements, vec!["key", "val"]);
    }

    #[test]
    fn test_repeated_init_scopes_merge() {
        let table = mine(
            "a.go",
            "package a\n\nfunc init() {\n\tmsg := \"first\"\n\t_ = msg\n}\n\nfunc init() {\n\tmsg := \"second\"\n\t_ = msg\n}\n",
        );
        let init = &table["filename:a.go+++pkg:a+++declType:FUNC+++name:init"];
        assert_eq!(init.body_text, vec!["first", "second"]);
    }
}
