// src/watch/mod.rs

//! File watching and rebuild dispatch.
//!
//! This module is responsible for:
//! - Classifying changed paths into glob groups (scripts / styles / images /
//!   fonts).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Triggering exactly the steps mapped to each group on change.
//!
//! It does **not** know how steps transform files; redundant work on
//! unchanged files is suppressed by the per-step caches.

pub mod dispatcher;
pub mod groups;
pub mod watcher;

pub use groups::{WatchGroup, WatchGroups};
pub use watcher::{WatcherHandle, spawn_watcher};
