mod common;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::{ProjectFixture, init_tracing, tree_snapshot};

use assetpipe::fanout::{OutputFile, write_fanout};

type TestResult = Result<(), Box<dyn Error>>;

fn output(rel: &str, contents: &str) -> OutputFile {
    OutputFile {
        rel_path: PathBuf::from(rel),
        contents: Arc::new(contents.as_bytes().to_vec()),
    }
}

#[test]
fn writes_identical_trees_to_every_destination() -> TestResult {
    init_tracing();

    let fx = ProjectFixture::new();
    let dests = vec![fx.root().join("public/js"), fx.root().join("packaged/js")];

    let files = vec![output("app.js", "var a;"), output("nested/util.js", "var u;")];
    let written = write_fanout(&files, &dests)?;

    assert_eq!(written, 4, "2 files x 2 destinations");
    assert_eq!(
        tree_snapshot(&dests[0]),
        tree_snapshot(&dests[1]),
        "destinations must be byte-identical"
    );
    assert_eq!(fx.read("public/js/nested/util.js"), "var u;");

    Ok(())
}

#[test]
fn empty_file_set_writes_nothing() -> TestResult {
    init_tracing();

    let fx = ProjectFixture::new();
    let dests = vec![fx.root().join("public/js")];

    assert_eq!(write_fanout(&[], &dests)?, 0);
    assert!(!fx.exists("public/js"), "no directories created for empty sets");

    Ok(())
}

/// A failing destination does not skip the remaining ones; the error is
/// reported after all writes were attempted.
#[cfg(unix)]
#[test]
fn one_failing_destination_does_not_skip_the_others() -> TestResult {
    init_tracing();

    let fx = ProjectFixture::new();
    // A regular file where a destination directory is expected makes every
    // write beneath it fail.
    fx.write("blocked", "not a directory");

    let dests = vec![fx.root().join("blocked"), fx.root().join("public/js")];
    let files = vec![output("app.js", "var a;")];

    let result = write_fanout(&files, &dests);

    assert!(result.is_err());
    assert_eq!(
        fx.read("public/js/app.js"),
        "var a;",
        "healthy destination must still receive the file"
    );

    Ok(())
}
