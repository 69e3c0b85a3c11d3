//! Dictionary words and noun phrases per declaration.

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::{MinedTable, Miner, DECLARATIONS};
use crate::core::addressing::CanonicalIdBuilder;
use crate::core::identifier::DeclKind;
use crate::core::source::SourceFile;
use crate::lang::common::{CommentGroup, Decl, FuncDecl, GoFile, TypeBody, TypeDecl, ValueDecl};
use crate::text::{noun_phrases, split_identifier_lower, words, Dictionary};

/// Words and phrases mined for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedDeclaration {
    pub id: String,
    pub kind: DeclKind,
    pub words: BTreeSet<String>,
    pub phrases: BTreeSet<String>,
}

impl MinedDeclaration {
    fn new(id: String, kind: DeclKind) -> Self {
        Self {
            id,
            kind,
            words: BTreeSet::new(),
            phrases: BTreeSet::new(),
        }
    }
}

pub struct DeclarationsMiner {
    dictionary: Arc<Dictionary>,
    table: AHashMap<String, MinedDeclaration>,
}

impl DeclarationsMiner {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            table: AHashMap::new(),
        }
    }

    fn entry(&mut self, id: String, kind: DeclKind) -> &mut MinedDeclaration {
        self.table
            .entry(id.clone())
            .or_insert_with(|| MinedDeclaration::new(id, kind))
    }

    fn mine_func(&mut self, file: &SourceFile, syntax: &GoFile, func: &FuncDecl) {
        let mut builder = CanonicalIdBuilder::new()
            .filename(&file.name)
            .package(&syntax.package)
            .decl_type(DeclKind::Func)
            .name(&func.name.name);
        if let Some(receiver) = &func.receiver {
            builder = builder.receiver(&receiver.type_name);
        }

        let mut texts: Vec<&str> = func.doc.iter().map(|doc| doc.text.as_str()).collect();
        texts.extend(syntax.comments_within(&func.span).map(|c| c.text.as_str()));

        let dictionary = Arc::clone(&self.dictionary);
        let entry = self.entry(builder.build(), DeclKind::Func);
        mine_name(&dictionary, &func.name.name, entry);
        for text in texts {
            mine_text(&dictionary, text, entry);
        }
    }

    fn mine_values(&mut self, file: &SourceFile, syntax: &GoFile, decl: &ValueDecl) {
        let kind = DeclKind::from(decl.kind);
        let dictionary = Arc::clone(&self.dictionary);

        for spec in &decl.specs {
            let texts = comment_texts([&decl.doc, &spec.doc, &spec.comment]);
            for ident in spec.names.iter().filter(|ident| ident.name != "_") {
                let id = CanonicalIdBuilder::new()
                    .filename(&file.name)
                    .package(&syntax.package)
                    .decl_type(kind)
                    .name(&ident.name)
                    .build();
                let entry = self.entry(id, kind);
                mine_name(&dictionary, &ident.name, entry);
                for text in texts.iter().chain(spec.literals.iter()) {
                    mine_text(&dictionary, text, entry);
                }
            }
        }
    }

    fn mine_types(&mut self, file: &SourceFile, syntax: &GoFile, decl: &TypeDecl) {
        let dictionary = Arc::clone(&self.dictionary);

        for spec in &decl.specs {
            let kind = match &spec.body {
                TypeBody::Struct(_) => DeclKind::Struct,
                TypeBody::Interface(_) => DeclKind::Interface,
                TypeBody::Other(_) => continue,
            };
            let id = CanonicalIdBuilder::new()
                .filename(&file.name)
                .package(&syntax.package)
                .decl_type(kind)
                .name(&spec.name.name)
                .build();

            let mut names = vec![spec.name.name.as_str()];
            let mut texts = comment_texts([&decl.doc, &spec.doc, &spec.comment]);
            match &spec.body {
                TypeBody::Struct(fields) => {
                    for field in fields {
                        names.extend(field.names.iter().map(|ident| ident.name.as_str()));
                        texts.extend(comment_texts([&field.doc, &field.comment]));
                    }
                }
                TypeBody::Interface(methods) => {
                    for method in methods {
                        names.push(method.name.name.as_str());
                        texts.extend(comment_texts([&method.doc, &method.comment]));
                    }
                }
                TypeBody::Other(_) => {}
            }

            let entry = self.entry(id, kind);
            for name in names {
                mine_name(&dictionary, name, entry);
            }
            for text in &texts {
                mine_text(&dictionary, text, entry);
            }
        }
    }
}

fn comment_texts<const N: usize>(groups: [&Option<CommentGroup>; N]) -> Vec<String> {
    groups
        .into_iter()
        .flatten()
        .map(|group| group.text.clone())
        .collect()
}

fn mine_name(dictionary: &Dictionary, name: &str, entry: &mut MinedDeclaration) {
    entry.words.extend(
        split_identifier_lower(name)
            .into_iter()
            .filter(|part| dictionary.contains(part)),
    );
}

fn mine_text(dictionary: &Dictionary, text: &str, entry: &mut MinedDeclaration) {
    entry
        .words
        .extend(words(text).into_iter().filter(|word| dictionary.contains(word)));
    entry.phrases.extend(noun_phrases(text));
}

impl Miner for DeclarationsMiner {
    fn name(&self) -> &'static str {
        DECLARATIONS
    }

    fn consume(&mut self, file: &SourceFile) {
        let Some(syntax) = file.syntax.clone() else {
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
        MinedTable::Declarations(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::RawSource;
    use crate::lang::go::GoParser;

    fn mine(source: &str) -> AHashMap<String, MinedDeclaration> {
        let mut parser = GoParser::new().unwrap();
        let file = SourceFile::parse(RawSource::new("main.go", source), &mut parser);
        let mut miner = Box::new(DeclarationsMiner::new(Arc::new(Dictionary::embedded())));
        miner.consume(&file);
        match miner.results() {
            MinedTable::Declarations(table) => table,
            other => panic!("unexpected table {other:?}"),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_function_words_and_phrases() {
        let table = mine(
            "package main\n\n// main is the main function, the entry point, zarasa\nfunc main() {\n\t// inner comment\n}\n",
        );
        let mined = &table["filename:main.go+++pkg:main+++declType:FUNC+++name:main"];
        assert_eq!(mined.kind, DeclKind::Func);
        assert_eq!(
            mined.words,
            set(&["main", "is", "the", "function", "entry", "point", "inner", "comment"])
        );
        assert_eq!(
            mined.phrases,
            set(&["main function", "entry point", "inner comment"])
        );
    }

    #[test]
    fn test_method_is_keyed_by_receiver() {
        let table = mine("package srv\n\ntype Server struct{}\n\n// Start opens the listener socket\nfunc (s *Server) Start() {}\n");
        let mined = &table["filename:main.go+++pkg:srv+++declType:FUNC+++name:Server.Start"];
        assert!(mined.words.contains("start"));
        assert!(mined.phrases.contains("listener socket"));
    }

    #[test]
    fn test_grouped_values_merge_block_doc_and_literals() {
        let table = mine(
            "package cfg\n\n// default network settings\nconst (\n\t// retry limit\n\tmaxRetry = 3\n\tbanner, _ = \"welcome message\", 1 // greeting text\n)\n",
        );
        let retry = &table["filename:main.go+++pkg:cfg+++declType:CONST+++name:maxRetry"];
        assert!(retry.words.contains("retry"));
        assert!(retry.words.contains("network"));
        assert!(retry.phrases.contains("default network settings"));
        assert!(retry.phrases.contains("retry limit"));

        let banner = &table["filename:main.go+++pkg:cfg+++declType:CONST+++name:banner"];
        assert!(banner.phrases.contains("welcome message"));
        assert!(banner.phrases.contains("greeting text"));
        assert!(!table.keys().any(|id| id.ends_with("name:_")));
    }

    #[test]
    fn test_struct_and_interface_members() {
        let table = mine(
            "package shapes\n\n// Shape is a closed figure\ntype Shape interface {\n\t// Area returns the surface size\n\tArea() float64\n}\n\ntype Point struct {\n\tX, Y int // grid position\n\tlabel string\n}\n\ntype ID string\n",
        );
        let shape = &table["filename:main.go+++pkg:shapes+++declType:INTERFACE+++name:Shape"];
        assert!(shape.words.contains("area"));
        assert!(shape.phrases.contains("closed figure"));
        assert!(shape.phrases.contains("surface size"));

        let point = &table["filename:main.go+++pkg:shapes+++declType:STRUCT+++name:Point"];
        assert!(point.words.contains("label"));
        assert!(point.phrases.contains("grid position"));

        assert!(!table.keys().any(|id| id.ends_with("name:ID")));
    }
}
