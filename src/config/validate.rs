// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::BuildConfig;
use crate::errors::{PipelineError, Result};

pub fn validate(cfg: &BuildConfig) -> Result<()> {
    validate_dest_roots(cfg)?;
    validate_vendor(cfg)?;
    Ok(())
}

fn validate_dest_roots(cfg: &BuildConfig) -> Result<()> {
    if cfg.dest_roots.is_empty() {
        return Err(PipelineError::ConfigError(
            "dest_roots must contain at least one destination root".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for root in &cfg.dest_roots {
        let s = root.to_string_lossy();
        if s.is_empty() || s == "." {
            return Err(PipelineError::ConfigError(format!(
                "destination root {s:?} would be removed by clean; pick a dedicated directory"
            )));
        }
        if !seen.insert(root) {
            return Err(PipelineError::ConfigError(format!(
                "duplicate destination root {s:?}"
            )));
        }
    }

    Ok(())
}

fn validate_vendor(cfg: &BuildConfig) -> Result<()> {
    for (kind, segment) in [("js", &cfg.vendor.js), ("css", &cfg.vendor.css)] {
        if segment.is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "vendor.{kind} must not be empty"
            )));
        }
        if segment.contains('/') || segment.contains('\\') {
            return Err(PipelineError::ConfigError(format!(
                "vendor.{kind} must be a bare directory name, got {segment:?}"
            )));
        }
    }
    Ok(())
}
