use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};

use assetpipe::config::{BuildConfig, VendorConfig};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// A throwaway project tree rooted in a tempdir.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("creating fixture tempdir"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Write a file at a root-relative path, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating fixture dirs");
        }
        fs::write(&path, contents).expect("writing fixture file");
        path
    }

    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.dir.path().join(rel)).expect("creating fixture dir");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel))
            .unwrap_or_else(|e| panic!("reading fixture file {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.dir.path().join(rel).exists()
    }

    /// Default config rooted at this fixture.
    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            root: self.root(),
            ..BuildConfig::default()
        }
    }

    /// Config with both vendor segments overridden.
    pub fn config_with_vendor(&self, vendor: &str) -> BuildConfig {
        BuildConfig {
            root: self.root(),
            vendor: VendorConfig {
                js: vendor.to_string(),
                css: vendor.to_string(),
            },
            ..BuildConfig::default()
        }
    }
}

/// Collect every file under `root` as (relative path, contents) pairs,
/// sorted by path. Used to compare destination trees byte for byte.
pub fn tree_snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    if !root.is_dir() {
        return files;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("reading snapshot dir") {
            let path = entry.expect("reading snapshot entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path
                    .strip_prefix(root)
                    .expect("snapshot path under root")
                    .to_string_lossy()
                    .replace('\\', "/");
                let contents = fs::read(&path).expect("reading snapshot file");
                files.push((rel, contents));
            }
        }
    }
    files.sort();
    files
}
