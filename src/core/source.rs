//! Source records handed to the pipeline and the filesystem reader that
//! produces them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::errors::{NomenError, Result};
use crate::lang::common::GoFile;
use crate::lang::go::GoParser;
use crate::lang::registry::is_go_source;

/// A file as delivered by a reader, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    /// Path relative to the analysed root, `/`-separated
    pub name: String,
    pub bytes: Vec<u8>,
    /// Set when the reader could not load the file
    pub error: Option<String>,
}

impl RawSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// A parsed (or failed) source file, shared read-only by miners and extractors.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub syntax: Option<Arc<GoFile>>,
    pub parse_error: Option<String>,
}

impl SourceFile {
    /// Parse a raw source; read errors and syntax errors end up in `parse_error`.
    pub fn parse(raw: RawSource, parser: &mut GoParser) -> Self {
        let RawSource { name, bytes, error } = raw;
        let outcome = match error {
            Some(error) => Err(error),
            None => std::str::from_utf8(&bytes)
                .map_err(NomenError::from)
                .and_then(|text| parser.parse(text, &name))
                .map_err(|e| e.to_string()),
        };

        let (syntax, parse_error) = match outcome {
            Ok(file) => (Some(Arc::new(file)), None),
            Err(message) => (None, Some(message)),
        };
        Self {
            name,
            bytes: bytes.into(),
            syntax,
            parse_error,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.syntax.is_some()
    }

    /// Directory part of the file name, empty for files at the root.
    pub fn directory(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// Supplies the raw sources of one analysis run.
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn read_sources(&self) -> Result<Vec<RawSource>>;
}

#[async_trait]
impl SourceReader for Vec<RawSource> {
    async fn read_sources(&self) -> Result<Vec<RawSource>> {
        Ok(self.clone())
    }
}

/// Reads every Go file below a root directory.
#[derive(Debug, Clone)]
pub struct FsSourceReader {
    root: PathBuf,
    batch_size: usize,
}

impl FsSourceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            batch_size: 64,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Go files below the root in a stable order, skipping `vendor/` and hidden dirs.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(NomenError::config_field(
                format!("Source root is not a directory: {}", self.root.display()),
                "root",
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_go_source(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry below {}: {}", self.root.display(), e),
            }
        }
        debug!("Discovered {} Go files below {}", files.len(), self.root.display());
        Ok(files)
    }

    fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "vendor" || name.starts_with('.')
}

#[async_trait]
impl SourceReader for FsSourceReader {
    async fn read_sources(&self) -> Result<Vec<RawSource>> {
        let files = self.discover()?;
        let mut sources = Vec::with_capacity(files.len());

        for batch in files.chunks(self.batch_size) {
            let reads = batch.iter().map(|path| {
                let name = self.relative_name(path);
                async move {
                    match tokio::fs::read(path).await {
                        Ok(bytes) => RawSource::new(name, bytes),
                        Err(e) => {
                            warn!("Failed to read {}: {}", path.display(), e);
                            RawSource::failed(name, e.to_string())
                        }
                    }
                }
            });
            sources.extend(future::join_all(reads).await);
        }

        Ok(sources)
    }
}
