mod common;

use std::error::Error;
use std::sync::Arc;

use tokio::time::{Duration, sleep, timeout};

use crate::common::{ProjectFixture, init_tracing};

use assetpipe::pipeline::Pipeline;
use assetpipe::watch::{WatchGroup, WatchGroups};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn groups_classify_paths_relative_to_assets() -> TestResult {
    init_tracing();

    let groups = WatchGroups::new()?;

    assert_eq!(
        groups.classify("javascripts/app.js"),
        vec![WatchGroup::Scripts]
    );
    assert_eq!(
        groups.classify("stylesheets/site.less"),
        vec![WatchGroup::Styles]
    );
    assert_eq!(groups.classify("images/logo.svg"), vec![WatchGroup::Images]);
    assert_eq!(groups.classify("fonts/body.woff"), vec![WatchGroup::Fonts]);
    assert_eq!(
        groups.classify("stylesheets/fonts/icons.woff"),
        vec![WatchGroup::Fonts]
    );
    // Vendor paths classify like any other script; the triggered step's own
    // excludes keep them out of the transform.
    assert_eq!(
        groups.classify("javascripts/plugins/lib.js"),
        vec![WatchGroup::Scripts]
    );
    assert!(groups.classify("stylesheets/readme.txt").is_empty());

    Ok(())
}

/// Poll until the given file has the expected contents, or time out.
async fn wait_for_content(fx: &ProjectFixture, rel: &str, expected: &str) -> bool {
    let deadline = timeout(Duration::from_secs(10), async {
        loop {
            if fx.exists(rel) && fx.read(rel) == expected {
                return;
            }
            sleep(Duration::from_millis(100)).await;
        }
    });
    deadline.await.is_ok()
}

/// End-to-end watch loop: a changed script is rebuilt into the destination
/// roots without re-running the whole pipeline.
#[tokio::test]
async fn script_change_triggers_rebuild() -> TestResult {
    init_tracing();

    let fx = ProjectFixture::new();
    fx.write("assets/javascripts/app.js", "var app = 1;\n");

    let pipeline = Arc::new(Pipeline::new(fx.config())?);
    let handle = Arc::clone(&pipeline).run_default().await?;

    assert_eq!(fx.read("public/javascripts/app.js"), "var app = 1;\n");

    // Give the watcher a moment to settle before generating events.
    sleep(Duration::from_millis(300)).await;

    fx.write("assets/javascripts/app.js", "var app = 2;\n");

    assert!(
        wait_for_content(&fx, "public/javascripts/app.js", "var app = 2;\n").await,
        "watcher never rebuilt the changed script"
    );
    assert!(
        wait_for_content(
            &fx,
            "target/web/public/main/javascripts/app.js",
            "var app = 2;\n"
        )
        .await,
        "secondary destination root was not updated"
    );

    drop(handle);
    Ok(())
}

/// A new stylesheet appearing under watch is built into the destination.
#[tokio::test]
async fn new_stylesheet_is_picked_up() -> TestResult {
    init_tracing();

    let fx = ProjectFixture::new();
    fx.write("assets/stylesheets/site.css", "a { color: red; }\n");

    let pipeline = Arc::new(Pipeline::new(fx.config())?);
    let handle = Arc::clone(&pipeline).run_default().await?;

    sleep(Duration::from_millis(300)).await;

    fx.write("assets/stylesheets/extra.css", "b { color: blue; }\n");

    assert!(
        wait_for_content(&fx, "public/stylesheets/extra.css", "b { color: blue; }\n").await,
        "watcher never built the new stylesheet"
    );

    drop(handle);
    Ok(())
}
