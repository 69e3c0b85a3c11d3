//! Word lists used to filter mined words and to score rewrites.

use std::path::Path;

use ahash::AHashSet;
use tracing::debug;

use crate::core::errors::{Result, ResultExt};

const EMBEDDED_WORDS: &str = include_str!("words.txt");

/// Common programming abbreviations recognised by dictionary-driven splitting.
pub const KNOWN_ABBREVIATIONS: &[&str] = &[
    "addr", "alloc", "arg", "args", "attr", "auth", "buf", "cfg", "char", "cmd", "cnt", "conf",
    "conn", "ctx", "ctrl", "cur", "db", "dec", "def", "del", "desc", "dest", "dir", "doc", "dst",
    "elem", "env", "err", "expr", "fd", "fmt", "fn", "func", "gen", "hdr", "idx", "impl", "inc",
    "init", "iter", "len", "lib", "ln", "max", "mem", "min", "msg", "mut", "num", "obj", "opt",
    "opts", "pkg", "pos", "prev", "ptr", "pwd", "req", "res", "resp", "ret", "sb", "sep", "src",
    "srv", "stmt", "str", "sync", "sys", "tmp", "tok", "tx", "val", "var", "vec",
];

/// Case-insensitive word list.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: AHashSet<String>,
}

impl Dictionary {
    /// Build a dictionary from arbitrary words (lower-cased, blanks dropped).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// The word list compiled into the crate.
    pub fn embedded() -> Self {
        Self::from_words(EMBEDDED_WORDS.lines())
    }

    /// Load a newline-separated word list.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list {}", path.display()))?;
        let dictionary = Self::from_words(content.lines());
        debug!(
            "Loaded {} dictionary words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Add every word of `other` to this dictionary.
    pub fn extend(&mut self, other: Dictionary) {
        self.words.extend(other.words);
    }

    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        word.chars().any(char::is_uppercase) && self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// True when `token` is one of [`KNOWN_ABBREVIATIONS`].
pub fn is_known_abbreviation(token: &str) -> bool {
    KNOWN_ABBREVIATIONS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::NomenError;
    use std::io::Write;

    #[test]
    fn test_embedded_dictionary() {
        let dictionary = Dictionary::embedded();
        for word in ["main", "is", "the", "function", "entry", "point", "inner", "comment"] {
            assert!(dictionary.contains(word), "{} should be a dictionary word", word);
        }
        assert!(dictionary.contains("Delete"));
        assert!(!dictionary.contains("zarasa"));
        assert!(!dictionary.contains("str"));
    }

    #[test]
    fn test_from_file_and_extend() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zarasa\n\n  Gopher  ").unwrap();

        let loaded = Dictionary::from_file(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("gopher"));

        let mut dictionary = Dictionary::embedded();
        let before = dictionary.len();
        dictionary.extend(loaded);
        assert_eq!(dictionary.len(), before + 2);
        assert!(dictionary.contains("zarasa"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Dictionary::from_file(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(matches!(err, NomenError::Io { .. }));
    }

    #[test]
    fn test_known_abbreviations() {
        assert!(is_known_abbreviation("str"));
        assert!(!is_known_abbreviation("string"));
    }
}
