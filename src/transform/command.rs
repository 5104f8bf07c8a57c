// src/transform/command.rs

//! External command transform: pipe a file through a shell command.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::{SourceFile, Transform};

/// Placeholder in a command template replaced with the comma-joined browser
/// support list, e.g. `autoprefixer --browsers '{browsers}'`.
pub const BROWSERS_PLACEHOLDER: &str = "{browsers}";

/// Runs a shell command per file, writing the file contents to stdin and
/// reading the transformed contents from stdout.
///
/// A non-zero exit status is a per-file transform error carrying the tool's
/// stderr, so one malformed asset never blocks the rest of the batch.
pub struct CommandTransform {
    name: String,
    command: String,
}

impl CommandTransform {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }

    /// Build a transform from a command template, substituting
    /// [`BROWSERS_PLACEHOLDER`] with the configured support list.
    pub fn with_browsers(
        name: impl Into<String>,
        template: &str,
        browsers: &[String],
    ) -> Self {
        let command = template.replace(BROWSERS_PLACEHOLDER, &browsers.join(", "));
        Self::new(name, command)
    }

    /// Build a shell command appropriate for the platform.
    fn shell_command(&self) -> Command {
        if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.command);
            c
        }
    }
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: &SourceFile) -> Result<Vec<u8>> {
        debug!(
            transform = %self.name,
            cmd = %self.command,
            path = ?file.rel_path,
            "piping file through external command"
        );

        let mut child = self
            .shell_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning command for transform '{}'", self.name))?;

        // Feed stdin from a separate thread so a child filling the stdout
        // pipe can't deadlock against us still writing its input.
        let mut stdin = child.stdin.take().context("child stdin not captured")?;
        let contents = file.contents.clone();
        let writer = std::thread::spawn(move || stdin.write_all(&contents));

        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for transform '{}'", self.name))?;

        match writer.join() {
            Ok(res) => res.with_context(|| {
                format!("writing {:?} to transform '{}'", file.rel_path, self.name)
            })?,
            Err(_) => bail!("stdin writer thread panicked for transform '{}'", self.name),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "transform '{}' failed on {:?} ({}): {}",
                self.name,
                file.rel_path,
                output.status,
                stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}
