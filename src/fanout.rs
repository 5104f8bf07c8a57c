// src/fanout.rs

//! Fan-out writer: duplicate one output set across N destination roots.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{PipelineError, Result};

/// One transformed (or verbatim-copied) file, path relative to the step's
/// destination subdirectory.
#[derive(Clone)]
pub struct OutputFile {
    pub rel_path: PathBuf,
    pub contents: Arc<Vec<u8>>,
}

impl fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFile")
            .field("rel_path", &self.rel_path)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Write every file into every destination directory, preserving relative
/// paths and creating parent directories as needed.
///
/// Each write is independent: a failure writing one destination is logged and
/// does not skip the others. After every write has been attempted, any
/// failure surfaces as a single error naming the count and the first cause.
/// Returns the number of successful writes.
pub fn write_fanout(files: &[OutputFile], dest_dirs: &[PathBuf]) -> Result<usize> {
    let mut written = 0usize;
    let mut failed = 0usize;
    let mut first_error: Option<std::io::Error> = None;

    for file in files {
        for dest in dest_dirs {
            let target = dest.join(&file.rel_path);
            match write_one(&target, &file.contents) {
                Ok(()) => {
                    debug!(path = ?target, "wrote output file");
                    written += 1;
                }
                Err(err) => {
                    warn!(path = ?target, error = %err, "failed to write output file");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                    failed += 1;
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(PipelineError::FanoutError(format!(
            "{failed} destination write(s) failed, first: {err}"
        ))),
        None => Ok(written),
    }
}

fn write_one(target: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, contents)
}
