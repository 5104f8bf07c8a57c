// src/transform/mod.rs

//! The transform seam.
//!
//! Every actual transformation (transpile, preprocess, prefix, minify,
//! optimize) is an opaque external collaborator behind the [`Transform`]
//! trait. Production setups plug in external tools via
//! [`CommandTransform`]; the built-ins in [`builtin`] are conservative
//! fallbacks so the pipeline works with no external tooling installed.

pub mod builtin;
pub mod command;

use std::path::PathBuf;

use anyhow::Result;

pub use builtin::{Passthrough, ScriptMinifier, StyleMinifier};
pub use command::CommandTransform;

/// One glob-matched input file, path relative to the step's source root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rel_path: PathBuf,
    pub contents: Vec<u8>,
}

/// A named transformation applied to one file at a time.
///
/// Errors are per-file: a failing `apply` is reported and the batch
/// continues, it never aborts the step.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>>;
}

/// Applies several transforms in sequence (e.g. preprocess, then prefix).
/// The first per-file error aborts the chain for that file only.
pub struct Chain {
    name: String,
    stages: Vec<std::sync::Arc<dyn Transform>>,
}

impl Chain {
    pub fn new(stages: Vec<std::sync::Arc<dyn Transform>>) -> Self {
        let name = stages
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("+");
        Self { name, stages }
    }
}

impl Transform for Chain {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>> {
        let mut current = SourceFile {
            rel_path: file.rel_path.clone(),
            contents: file.contents.clone(),
        };
        for stage in &self.stages {
            current.contents = stage.apply(&current)?;
        }
        Ok(current.contents)
    }
}
