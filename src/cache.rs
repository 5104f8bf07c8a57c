// src/cache.rs

//! Per-step cache of already-processed files.
//!
//! Each [`TransformStep`](crate::step::TransformStep) owns one `StepCache`,
//! constructed with a stable key (e.g. `"build:js"`). Two steps must never
//! share a key, otherwise unrelated files would suppress each other's work;
//! keys are chosen by the pipeline at construction and are unique there.
//!
//! The cache serves two purposes:
//! - skip re-transforming files whose content is unchanged since they were
//!   last remembered,
//! - re-emit the remembered outputs of unchanged files, so a later full-tree
//!   phase (minification) always sees the complete output set, not only the
//!   freshly transformed delta.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::fanout::OutputFile;

/// Compute the content hash of a file's bytes.
pub fn content_hash(contents: &[u8]) -> String {
    blake3::hash(contents).to_hex().to_string()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    source_hash: String,
    output: OutputFile,
}

/// In-memory cache of processed files for a single step.
///
/// No eviction policy: entries persist for the life of the process, except
/// when [`clear`](StepCache::clear) is called (the pipeline clears every step
/// cache on `clean`, so a clean-then-rebuild re-writes every output).
#[derive(Debug)]
pub struct StepCache {
    key: String,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl StepCache {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: HashMap::new(),
        }
    }

    /// Stable key identifying the step this cache belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the file was never remembered under this cache, or its
    /// content changed since it was last remembered.
    pub fn should_process(&self, rel_path: &Path, contents: &[u8]) -> bool {
        match self.entries.get(rel_path) {
            Some(entry) => entry.source_hash != content_hash(contents),
            None => true,
        }
    }

    /// Remembered transformed output for a file, valid only when
    /// [`should_process`](StepCache::should_process) returned false.
    pub fn cached_output(&self, rel_path: &Path) -> Option<OutputFile> {
        self.entries.get(rel_path).map(|e| e.output.clone())
    }

    /// Record the source content hash and the transformed output for a file.
    pub fn remember(&mut self, rel_path: &Path, contents: &[u8], output: OutputFile) {
        debug!(step = %self.key, path = ?rel_path, "remembering transformed output");
        self.entries.insert(
            rel_path.to_path_buf(),
            CacheEntry {
                source_hash: content_hash(contents),
                output,
            },
        );
    }

    /// Drop a single entry (e.g. when the source file disappeared).
    pub fn forget(&mut self, rel_path: &Path) {
        if self.entries.remove(rel_path).is_some() {
            debug!(step = %self.key, path = ?rel_path, "forgot cached output");
        }
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!(step = %self.key, entries = self.entries.len(), "clearing step cache");
        }
        self.entries.clear();
    }

    /// Number of remembered files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convenience used by steps when building an [`OutputFile`] to remember.
pub fn output_file(rel_path: PathBuf, contents: Vec<u8>) -> OutputFile {
    OutputFile {
        rel_path,
        contents: Arc::new(contents),
    }
}
