// src/transform/builtin.rs

//! Built-in fallback transforms.
//!
//! These deliberately never parse the language they operate on. They exist so
//! the pipeline is usable and testable with no external tools configured;
//! real deployments point the `[tools]` config section at proper tooling.

use anyhow::Result;

use super::{SourceFile, Transform};

/// Identity transform, used for verbatim copies and for seams whose external
/// tool is not configured (transpile, preprocess, prefix, image optimize).
pub struct Passthrough {
    name: String,
}

impl Passthrough {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transform for Passthrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>> {
        Ok(file.contents.clone())
    }
}

/// Conservative script minifier: drops whole-line `//` comments, blank lines
/// and trailing whitespace. Never touches anything inside a line, so string
/// literals containing `//` (URLs etc.) are safe.
pub struct ScriptMinifier;

impl Transform for ScriptMinifier {
    fn name(&self) -> &str {
        "minify-js"
    }

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>> {
        let text = String::from_utf8_lossy(&file.contents);
        let mut out = String::with_capacity(text.len());
        for line in text.lines() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.trim_start().starts_with("//") {
                continue;
            }
            out.push_str(trimmed);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// Conservative stylesheet minifier: strips `/* ... */` comments outside of
/// string literals, then drops blank lines and leading indentation.
pub struct StyleMinifier;

impl Transform for StyleMinifier {
    fn name(&self) -> &str {
        "minify-css"
    }

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>> {
        let text = String::from_utf8_lossy(&file.contents);
        let stripped = strip_block_comments(&text);
        let mut out = String::with_capacity(stripped.len());
        for line in stripped.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            out.push_str(trimmed);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// Remove `/* ... */` comments, tracking single/double quotes so comment
/// markers inside string literals (e.g. `content: "/*"`) survive.
fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    // Skip until the closing marker; an unterminated comment
                    // swallows the rest of the input, matching CSS semantics.
                    let mut prev = '\0';
                    for n in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                }
                _ => out.push(c),
            },
        }
    }

    out
}
