mod common;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::init_tracing;

use assetpipe::transform::{
    Chain, Passthrough, ScriptMinifier, SourceFile, StyleMinifier, Transform,
};

type TestResult = Result<(), Box<dyn Error>>;

fn source(rel: &str, contents: &str) -> SourceFile {
    SourceFile {
        rel_path: PathBuf::from(rel),
        contents: contents.as_bytes().to_vec(),
    }
}

#[test]
fn passthrough_is_identity() -> TestResult {
    init_tracing();

    let copy = Passthrough::named("copy");
    let file = source("images/logo.svg", "<svg/>");
    assert_eq!(copy.apply(&file)?, b"<svg/>");
    assert_eq!(copy.name(), "copy");

    Ok(())
}

#[test]
fn script_minifier_drops_comment_and_blank_lines() -> TestResult {
    init_tracing();

    let file = source(
        "app.js",
        "// header\nvar a = 1;   \n\n  // indented comment\nvar url = \"http://x\"; // keep\n",
    );
    let out = String::from_utf8(ScriptMinifier.apply(&file)?)?;

    assert_eq!(out, "var a = 1;\nvar url = \"http://x\"; // keep\n");

    Ok(())
}

#[test]
fn style_minifier_strips_comments_but_not_string_contents() -> TestResult {
    init_tracing();

    let file = source(
        "a.css",
        "/* layout */\nbody {\n    margin: 0; /* reset */\n}\n.icon::before { content: \"/* not a comment */\"; }\n",
    );
    let out = String::from_utf8(StyleMinifier.apply(&file)?)?;

    assert!(!out.contains("layout"));
    assert!(!out.contains("reset"));
    assert!(out.contains("margin: 0;"));
    assert!(out.contains("content: \"/* not a comment */\";"));

    Ok(())
}

#[test]
fn style_minifier_handles_unterminated_comment() -> TestResult {
    init_tracing();

    let file = source("a.css", "a { color: red; }\n/* trailing");
    let out = String::from_utf8(StyleMinifier.apply(&file)?)?;
    assert_eq!(out, "a { color: red; }\n");

    Ok(())
}

#[test]
fn chain_applies_stages_in_order() -> TestResult {
    init_tracing();

    let chain = Chain::new(vec![
        Arc::new(Passthrough::named("less")),
        Arc::new(StyleMinifier),
    ]);
    assert_eq!(chain.name(), "less+minify-css");

    let file = source("site.less", "/* c */\n.a { color: red; }\n");
    let out = String::from_utf8(chain.apply(&file)?)?;
    assert_eq!(out, ".a { color: red; }\n");

    Ok(())
}

#[cfg(unix)]
#[test]
fn command_transform_substitutes_browsers_placeholder() -> TestResult {
    use assetpipe::transform::CommandTransform;

    init_tracing();

    let browsers = vec!["ie >= 9".to_string(), "last 2 versions".to_string()];
    let echo = CommandTransform::with_browsers("autoprefix", "echo '{browsers}'", &browsers);

    let out = echo.apply(&source("a.css", ""))?;
    assert_eq!(String::from_utf8(out)?.trim(), "ie >= 9, last 2 versions");

    Ok(())
}
