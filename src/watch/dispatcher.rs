// src/watch/dispatcher.rs

//! Turns filesystem change events into step re-runs.
//!
//! No debouncing or coalescing: every event independently triggers the
//! handler for its glob group(s). The per-step caches keep redundant events
//! cheap, since files whose content did not change are not re-transformed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::Event;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::pipeline::Pipeline;
use crate::step::TransformStep;
use crate::watch::groups::{WatchGroup, WatchGroups};

/// Consume notify events and trigger the steps mapped to each glob group.
/// Runs until the event channel closes (watcher handle dropped).
pub(crate) async fn dispatch_events(
    pipeline: Arc<Pipeline>,
    assets_root: PathBuf,
    groups: WatchGroups,
    mut event_rx: UnboundedReceiver<Event>,
) {
    while let Some(event) = event_rx.recv().await {
        debug!(?event, "received notify event");

        for path in &event.paths {
            let rel = match relative_str(&assets_root, path) {
                Some(r) => r,
                None => {
                    debug!(path = ?path, "event path outside assets root; ignoring");
                    continue;
                }
            };

            for group in groups.classify(&rel) {
                debug!(%group, path = %rel, "dispatching rebuild");
                let steps = pipeline.steps_for_group(group);
                // Overlapping runs are allowed; there is no coalescing.
                tokio::spawn(run_group(group, steps));
            }
        }
    }
    debug!("watch dispatcher finished");
}

/// Re-run every step of one group, with a progress line before and after.
async fn run_group(group: WatchGroup, steps: Vec<Arc<TransformStep>>) {
    println!("[assetpipe] {group} changed. Building...");

    let mut handles = Vec::with_capacity(steps.len());
    for step in steps {
        handles.push(tokio::task::spawn_blocking(move || step.run()));
    }

    let mut failed = false;
    for handle in handles {
        match handle.await {
            Ok(Ok(report)) => {
                debug!(step = %report.key, transformed = report.transformed, "watch rebuild step done");
            }
            Ok(Err(err)) => {
                warn!(%group, error = %err, "watch rebuild step failed");
                failed = true;
            }
            Err(err) => {
                warn!(%group, error = %err, "watch rebuild step panicked");
                failed = true;
            }
        }
    }

    if failed {
        println!("[assetpipe] {group} rebuild finished with errors.");
    } else {
        println!("[assetpipe] {group} rebuild complete.");
    }
}

fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
