//! Word frequency tables over identifier tokens, literals and comments.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::{MinedTable, Miner, GLOBAL_FREQUENCY, LOCAL_FREQUENCY};
use crate::core::source::SourceFile;
use crate::lang::common::{Decl, GoFile, TypeBody};
use crate::text::{split_identifier_lower, text_tokens};

/// Lower-cased word → occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: AHashMap<String, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        *self.counts.entry(token.to_lowercase()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Sum of every count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct words.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn merge(&mut self, other: &FrequencyTable) {
        for (token, count) in &other.counts {
            *self.counts.entry(token.clone()).or_insert(0) += count;
        }
        self.total += other.total;
    }

    fn add_identifier(&mut self, name: &str) {
        for token in split_identifier_lower(name) {
            if token.chars().all(char::is_alphabetic) {
                self.add(&token);
            }
        }
    }

    fn add_text(&mut self, text: &str) {
        for token in text_tokens(text) {
            self.add(&token);
        }
    }

    /// Fold every token-bearing part of a file into the table.
    fn add_file(&mut self, file: &GoFile) {
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => {
                    self.add_identifier(&func.name.name);
                    for field in func.params.iter().chain(func.results.iter()) {
                        for ident in &field.names {
                            self.add_identifier(&ident.name);
                        }
                    }
                    let body = &func.body;
                    for local in &body.locals {
                        self.add_identifier(&local.name);
                    }
                    for name in body.assigned.iter().chain(body.range_vars.iter()) {
                        self.add_identifier(name);
                    }
                    for literal in &body.literals {
                        self.add_text(literal);
                    }
                }
                Decl::Value(values) => {
                    for spec in &values.specs {
                        for ident in &spec.names {
                            self.add_identifier(&ident.name);
                        }
                        for literal in &spec.literals {
                            self.add_text(literal);
                        }
                    }
                }
                Decl::Type(types) => {
                    for spec in &types.specs {
                        self.add_identifier(&spec.name.name);
                        match &spec.body {
                            TypeBody::Struct(fields) => {
                                for ident in fields.iter().flat_map(|f| f.names.iter()) {
                                    self.add_identifier(&ident.name);
                                }
                            }
                            TypeBody::Interface(methods) => {
                                for method in methods {
                                    self.add_identifier(&method.name.name);
                                }
                            }
                            TypeBody::Other(_) => {}
                        }
                    }
                }
            }
        }

        for comment in &file.comments {
            self.add_text(&comment.text);
        }
    }
}

/// One table over the whole corpus.
#[derive(Debug, Default)]
pub struct GlobalFrequencyMiner {
    table: FrequencyTable,
}

impl Miner for GlobalFrequencyMiner {
    fn name(&self) -> &'static str {
        GLOBAL_FREQUENCY
    }

    fn consume(&mut self, file: &SourceFile) {
        if let Some(syntax) = &file.syntax {
            self.table.add_file(syntax);
        }
    }

    fn results(self: Box<Self>) -> MinedTable {
        MinedTable::GlobalFrequency(self.table)
    }
}

/// One table per file, keyed by file name.
#[derive(Debug, Default)]
pub struct LocalFrequencyMiner {
    tables: AHashMap<String, FrequencyTable>,
}

impl Miner for LocalFrequencyMiner {
    fn name(&self) -> &'static str {
        LOCAL_FREQUENCY
    }

    fn consume(&mut self, file: &SourceFile) {
        if let Some(syntax) = &file.syntax {
            self.tables
                .entry(file.name.clone())
                .or_default()
                .add_file(syntax);
        }
    }

    fn results(self: Box<Self>) -> MinedTable {
        MinedTable::LocalFrequency(self.tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::RawSource;
    use crate::lang::go::GoParser;

    const SOURCE: &str = "package main\n\n// read the config file\nfunc readConfig(path string) {\n\tfor _, line := range lines {\n\t\tcount = 1\n\t}\n\tmsg := \"config loaded\"\n}\n";

    fn parsed(name: &str, source: &str) -> SourceFile {
        let mut parser = GoParser::new().unwrap();
        SourceFile::parse(RawSource::new(name, source), &mut parser)
    }

    #[test]
    fn test_table_counts_and_merge() {
        let mut a = FrequencyTable::new();
        a.add("Config");
        a.add("config");
        a.add("");
        let mut b = FrequencyTable::new();
        b.add("file");
        a.merge(&b);

        assert_eq!(a.count("config"), 2);
        assert_eq!(a.count("file"), 1);
        assert_eq!(a.total(), 3);
        assert_eq!(a.distinct(), 2);
    }

    #[test]
    fn test_global_miner_folds_all_sources_of_tokens() {
        let mut miner = Box::new(GlobalFrequencyMiner::default());
        miner.consume(&parsed("main.go", SOURCE));
        let MinedTable::GlobalFrequency(table) = miner.results() else {
            panic!("expected global table");
        };

        // name, comment, literal
        assert_eq!(table.count("config"), 3);
        assert_eq!(table.count("read"), 2);
        assert_eq!(table.count("path"), 1);
        assert_eq!(table.count("line"), 1);
        assert_eq!(table.count("count"), 1);
        assert_eq!(table.count("msg"), 1);
        assert_eq!(table.count("loaded"), 1);
    }

    #[test]
    fn test_range_variables_count_once() {
        let mut miner = Box::new(GlobalFrequencyMiner::default());
        miner.consume(&parsed(
            "loop.go",
            "package main\n\nfunc walk() {\n\tfor key, val := range m {\n\t}\n\tfor key = range m {\n\t}\n}\n",
        ));
        let MinedTable::GlobalFrequency(table) = miner.results() else {
            panic!("expected global table");
        };

        // one declaring clause, one rebinding clause
        assert_eq!(table.count("key"), 2);
        assert_eq!(table.count("val"), 1);
    }

    #[test]
    fn test_local_miner_keeps_files_apart() {
        let mut miner = Box::new(LocalFrequencyMiner::default());
        miner.consume(&parsed("a.go", SOURCE));
        miner.consume(&parsed("b.go", "package main\n\nvar total int\n"));
        miner.consume(&parsed("c.go", "package main\nfunc {"));
        let MinedTable::LocalFrequency(tables) = miner.results() else {
            panic!("expected local tables");
        };

        assert_eq!(tables.len(), 2);
        assert_eq!(tables["b.go"].count("total"), 1);
        assert_eq!(tables["b.go"].count("config"), 0);
        assert_eq!(tables["a.go"].count("config"), 3);
    }
}
