use ahash::AHashMap;

use super::{MinedTable, Miner, COMMENTS};
use crate::core::source::SourceFile;

/// Collects every comment group of a file, in source order.
#[derive(Debug, Default)]
pub struct CommentsMiner {
    table: AHashMap<String, Vec<String>>,
}

impl Miner for CommentsMiner {
    fn name(&self) -> &'static str {
        COMMENTS
    }

    fn consume(&mut self, file: &SourceFile) {
        let Some(syntax) = &file.syntax else {
            return;
        };
        let texts = syntax
            .comments
            .iter()
            .map(|group| group.text.clone())
            .filter(|text| !text.is_empty());
        self.table.entry(file.name.clone()).or_default().extend(texts);
    }

    fn results(self: Box<Self>) -> MinedTable {
        MinedTable::Comments(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::RawSource;
    use crate::lang::go::GoParser;

    #[test]
    fn test_comments_in_order() {
        let mut parser = GoParser::new().unwrap();
        let file = SourceFile::parse(
            RawSource::new(
                "main.go",
                "// Package main runs things\npackage main\n\n/* block\n   note */\nfunc main() {\n\tx := 1 // trailing\n\t_ = x\n}\n",
            ),
            &mut parser,
        );

        let mut miner = Box::new(CommentsMiner::default());
        miner.consume(&file);
        let MinedTable::Comments(table) = miner.results() else {
            panic!("expected comments table");
        };
        assert_eq!(
            table["main.go"],
            vec!["Package main runs things", "block\nnote", "trailing"]
        );
    }
}
