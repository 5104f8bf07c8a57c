// src/step.rs

//! One logical build step: glob-matched inputs, a named transform, cached
//! per-file work, fan-out to every destination root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info, warn};

use crate::cache::{StepCache, output_file};
use crate::errors::Result;
use crate::fanout::{OutputFile, write_fanout};
use crate::transform::{SourceFile, Transform};

/// Outcome summary of a single step run.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub key: String,
    /// Files freshly transformed this run.
    pub transformed: usize,
    /// Files re-emitted from the step cache without re-transforming.
    pub cached: usize,
    /// Files whose transform failed; they are excluded from the output set.
    pub failed: usize,
    /// Successful destination writes (files x destination roots).
    pub written: usize,
}

/// One logical build step.
///
/// Copy operations are steps whose transform is a
/// [`Passthrough`](crate::transform::Passthrough).
pub struct TransformStep {
    key: String,
    source_root: PathBuf,
    include: GlobSet,
    exclude: Option<GlobSet>,
    transform: Arc<dyn Transform>,
    /// Rewrite the output file extension (e.g. `less` sources emit `css`).
    output_extension: Option<String>,
    dest_dirs: Vec<PathBuf>,
    cache: Mutex<StepCache>,
}

impl std::fmt::Debug for TransformStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformStep")
            .field("key", &self.key)
            .field("source_root", &self.source_root)
            .field("dest_dirs", &self.dest_dirs)
            .finish_non_exhaustive()
    }
}

impl TransformStep {
    pub fn new(
        key: impl Into<String>,
        source_root: impl Into<PathBuf>,
        include: &[String],
        exclude: &[String],
        transform: Arc<dyn Transform>,
        dest_dirs: Vec<PathBuf>,
    ) -> Result<Self> {
        let key = key.into();
        let include = build_globset(include)?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude)?)
        };

        Ok(Self {
            cache: Mutex::new(StepCache::new(key.clone())),
            key,
            source_root: source_root.into(),
            include,
            exclude,
            transform,
            output_extension: None,
            dest_dirs,
        })
    }

    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        self.output_extension = Some(ext.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dest_dirs(&self) -> &[PathBuf] {
        &self.dest_dirs
    }

    /// Drop all remembered per-file work for this step.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, StepCache> {
        // The cache is only touched for short, non-panicking sections; if a
        // holder panicked anyway, the map is still structurally valid.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true if the step would consider this path (relative to the
    /// source root) part of its input set.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Run the step once: collect inputs, transform what changed, merge in
    /// remembered outputs, write the full set to every destination root.
    ///
    /// A per-file transform error is reported and counted; the batch
    /// continues. A missing source root is an empty input set.
    pub fn run(&self) -> Result<StepReport> {
        let files = collect_input_files(&self.source_root, |rel| self.matches(rel))?;
        debug!(step = %self.key, inputs = files.len(), "collected step inputs");

        let mut outputs: Vec<OutputFile> = Vec::with_capacity(files.len());
        let mut transformed = 0usize;
        let mut cached = 0usize;
        let mut failed = 0usize;

        for rel in files {
            let abs = self.source_root.join(&rel);
            let contents = match fs::read(&abs) {
                Ok(c) => c,
                Err(err) => {
                    // The file can vanish between the walk and the read
                    // (watch mode races); treat it like a failed input.
                    warn!(step = %self.key, path = ?abs, error = %err, "failed to read input");
                    failed += 1;
                    continue;
                }
            };

            let reused = {
                let cache = self.cache();
                if cache.should_process(&rel, &contents) {
                    None
                } else {
                    cache.cached_output(&rel)
                }
            };

            if let Some(out) = reused {
                debug!(step = %self.key, path = ?rel, "cache hit; re-emitting remembered output");
                outputs.push(out);
                cached += 1;
                continue;
            }

            let src = SourceFile {
                rel_path: rel.clone(),
                contents,
            };
            match self.transform.apply(&src) {
                Ok(bytes) => {
                    let out = output_file(self.output_rel_path(&rel), bytes);
                    self.cache().remember(&rel, &src.contents, out.clone());
                    outputs.push(out);
                    transformed += 1;
                }
                Err(err) => {
                    warn!(
                        step = %self.key,
                        transform = %self.transform.name(),
                        path = ?rel,
                        error = %err,
                        "transform failed; continuing with remaining files"
                    );
                    failed += 1;
                }
            }
        }

        let written = write_fanout(&outputs, &self.dest_dirs)?;

        let report = StepReport {
            key: self.key.clone(),
            transformed,
            cached,
            failed,
            written,
        };
        info!(
            step = %self.key,
            transformed,
            cached,
            failed,
            written,
            "step finished"
        );
        Ok(report)
    }

    fn output_rel_path(&self, rel: &Path) -> PathBuf {
        match &self.output_extension {
            Some(ext) => rel.with_extension(ext),
            None => rel.to_path_buf(),
        }
    }
}

/// Collect all files under `root` whose root-relative path satisfies the
/// given matcher. Missing roots yield an empty set.
fn collect_input_files(
    root: &Path,
    matches: impl Fn(&str) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.is_dir() {
        debug!(root = ?root, "source root absent; empty input set");
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matches(&rel_str) {
                        files.push(rel.to_path_buf());
                    }
                }
            }
        }
    }

    // Stable ordering keeps logs and reports deterministic.
    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}
