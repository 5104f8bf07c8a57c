// src/watch/watcher.rs

use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::info;

use crate::errors::{PipelineError, Result};
use crate::pipeline::Pipeline;
use crate::watch::dispatcher::dispatch_events;
use crate::watch::groups::WatchGroups;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing the pipeline's `assets/` tree
/// recursively, re-running the steps mapped to each glob group on change.
pub fn spawn_watcher(pipeline: Arc<Pipeline>) -> Result<WatcherHandle> {
    let assets = pipeline.config().assets_dir();
    if !assets.is_dir() {
        return Err(PipelineError::ConfigError(format!(
            "assets directory {assets:?} does not exist; nothing to watch"
        )));
    }
    // Canonicalize once so event paths can be relativized reliably.
    let assets = assets.canonicalize().unwrap_or(assets);

    let groups = WatchGroups::new()?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("assetpipe: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("assetpipe: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&assets, RecursiveMode::Recursive)?;
    info!(root = ?assets, "file watcher started");

    tokio::spawn(dispatch_events(pipeline, assets, groups, event_rx));

    Ok(WatcherHandle { _inner: watcher })
}
