// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fanout;
pub mod logging;
pub mod pipeline;
pub mod step;
pub mod transform;
pub mod watch;

use std::sync::Arc;

use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::load_or_default;
use crate::errors::Result;
use crate::pipeline::Pipeline;

pub use crate::config::BuildConfig;
pub use crate::pipeline::{BuildReport, Pipeline as BuildPipeline};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the pipeline factory
/// - the selected task (`clean`, `build`, `watch`)
/// - Ctrl-C handling for the watch loop
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let pipeline = Pipeline::new(cfg)?;

    if args.dry_run {
        print_dry_run(&pipeline);
        return Ok(());
    }

    match args.command {
        Command::Clean => pipeline.run_clean().await,
        Command::Build => {
            let report = pipeline.run_build().await?;
            println!(
                "[assetpipe] Done: {} transformed, {} cached, {} failed, {} files written.",
                report.total_transformed(),
                report.total_cached(),
                report.total_failed(),
                report.total_written()
            );
            Ok(())
        }
        Command::Watch => {
            let pipeline = Arc::new(pipeline);
            let handle = pipeline.run_default().await?;
            println!("[assetpipe] Watching for changes. Press Ctrl-C to stop.");

            // Keep the watcher alive until Ctrl-C.
            tokio::signal::ctrl_c().await?;
            info!("shutdown requested; stopping watchers");
            drop(handle);
            Ok(())
        }
    }
}

/// Simple dry-run output: print steps, sources and destinations.
fn print_dry_run(pipeline: &Pipeline) {
    println!("assetpipe dry-run");
    println!("  root = {:?}", pipeline.config().root);
    println!("  dest_roots:");
    for root in pipeline.dest_roots() {
        println!("    - {}", root.display());
    }
    println!();

    let steps = pipeline.all_steps();
    println!("steps ({}):", steps.len());
    for step in steps {
        println!("  - {}", step.key());
        for dest in step.dest_dirs() {
            println!("      dest: {}", dest.display());
        }
    }
}
