// src/pipeline.rs

//! The build factory: wires transform steps into the `clean`, `build` and
//! `default` (watch) task graphs.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{BuildConfig, validate};
use crate::errors::Result;
use crate::step::{StepReport, TransformStep};
use crate::transform::{
    Chain, CommandTransform, Passthrough, ScriptMinifier, StyleMinifier, Transform,
};
use crate::watch::{WatchGroup, WatcherHandle};

/// Aggregated outcome of a full `build` (or initial `default`) pass.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub steps: Vec<StepReport>,
}

impl BuildReport {
    pub fn total_transformed(&self) -> usize {
        self.steps.iter().map(|s| s.transformed).sum()
    }

    pub fn total_cached(&self) -> usize {
        self.steps.iter().map(|s| s.cached).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.steps.iter().map(|s| s.failed).sum()
    }

    pub fn total_written(&self) -> usize {
        self.steps.iter().map(|s| s.written).sum()
    }
}

/// The pipeline: owns every step and exposes the three task entry points.
///
/// Construction compiles all glob sets and resolves destination roots; the
/// returned value is immutable apart from the per-step caches and is shared
/// with the watch dispatcher behind an `Arc`.
pub struct Pipeline {
    config: BuildConfig,
    dest_roots: Vec<PathBuf>,

    build_js: Arc<TransformStep>,
    build_css: Arc<TransformStep>,
    build_less: Arc<TransformStep>,
    build_sass: Arc<TransformStep>,

    copy_vendor_js: Arc<TransformStep>,
    copy_vendor_css: Arc<TransformStep>,
    copy_images: Arc<TransformStep>,
    copy_fonts: Arc<TransformStep>,
    copy_style_fonts: Arc<TransformStep>,

    min_js: Arc<TransformStep>,
    min_css: Arc<TransformStep>,
    opt_images: Arc<TransformStep>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("dest_roots", &self.dest_roots)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(config: BuildConfig) -> Result<Self> {
        validate(&config)?;

        let dest_roots = config.resolved_dest_roots();
        let assets = config.assets_dir();
        let dests =
            |sub: &str| dest_roots.iter().map(|r| r.join(sub)).collect::<Vec<_>>();

        let browsers = &config.browsers;
        let tools = &config.tools;

        // Seams with a configured external tool run it; the rest pass through.
        let transpile = tool_or_passthrough("transpile", &tools.transpile, browsers);
        let prefix = tool_or_passthrough("autoprefix", &tools.prefix, browsers);
        let preprocess_less =
            tool_or_passthrough("less", &tools.preprocess_less, browsers);
        let preprocess_sass =
            tool_or_passthrough("sass", &tools.preprocess_sass, browsers);
        let optimize_images =
            tool_or_passthrough("optimize-images", &tools.optimize_images, browsers);

        let minify_js: Arc<dyn Transform> = match &tools.minify_js {
            Some(t) => Arc::new(CommandTransform::with_browsers("minify-js", t, browsers)),
            None => Arc::new(ScriptMinifier),
        };
        let minify_css: Arc<dyn Transform> = match &tools.minify_css {
            Some(t) => Arc::new(CommandTransform::with_browsers("minify-css", t, browsers)),
            None => Arc::new(StyleMinifier),
        };

        let less_chain: Arc<dyn Transform> =
            Arc::new(Chain::new(vec![preprocess_less, Arc::clone(&prefix)]));
        let sass_chain: Arc<dyn Transform> =
            Arc::new(Chain::new(vec![preprocess_sass, Arc::clone(&prefix)]));

        let vendor_js_glob = format!("{}/**", config.vendor.js);
        let vendor_css_glob = format!("{}/**", config.vendor.css);

        let build_js = Arc::new(TransformStep::new(
            "build:js",
            assets.join("javascripts"),
            &pats(&["**/*.js"]),
            &[vendor_js_glob.clone()],
            transpile,
            dests("javascripts"),
        )?);

        let build_css = Arc::new(TransformStep::new(
            "build:css",
            assets.join("stylesheets"),
            &pats(&["**/*.css"]),
            &[vendor_css_glob.clone()],
            prefix,
            dests("stylesheets"),
        )?);

        let build_less = Arc::new(
            TransformStep::new(
                "build:less",
                assets.join("stylesheets"),
                &pats(&["**/*.less"]),
                &[vendor_css_glob.clone()],
                less_chain,
                dests("stylesheets"),
            )?
            .with_output_extension("css"),
        );

        let build_sass = Arc::new(
            TransformStep::new(
                "build:sass",
                assets.join("stylesheets"),
                &pats(&["**/*.scss"]),
                &[vendor_css_glob.clone()],
                sass_chain,
                dests("stylesheets"),
            )?
            .with_output_extension("css"),
        );

        let copy_vendor_js = Arc::new(TransformStep::new(
            "copy:vendor-js",
            assets.join("javascripts").join(&config.vendor.js),
            &pats(&["**"]),
            &[],
            Arc::new(Passthrough::named("copy")),
            dests(&format!("javascripts/{}", config.vendor.js)),
        )?);

        let copy_vendor_css = Arc::new(TransformStep::new(
            "copy:vendor-css",
            assets.join("stylesheets").join(&config.vendor.css),
            &pats(&["**"]),
            &[],
            Arc::new(Passthrough::named("copy")),
            dests(&format!("stylesheets/{}", config.vendor.css)),
        )?);

        let copy_images = Arc::new(TransformStep::new(
            "copy:images",
            assets.join("images"),
            &pats(&["**"]),
            &[],
            Arc::new(Passthrough::named("copy")),
            dests("images"),
        )?);

        let copy_fonts = Arc::new(TransformStep::new(
            "copy:fonts",
            assets.join("fonts"),
            &pats(&["**"]),
            &[],
            Arc::new(Passthrough::named("copy")),
            dests("fonts"),
        )?);

        let copy_style_fonts = Arc::new(TransformStep::new(
            "copy:style-fonts",
            assets.join("stylesheets").join("fonts"),
            &pats(&["**"]),
            &[],
            Arc::new(Passthrough::named("copy")),
            dests("stylesheets/fonts"),
        )?);

        // Minify reads from the first destination root and fans out to all
        // roots, so the byte-identical invariant holds by construction.
        let primary = dest_roots[0].clone();

        let min_js = Arc::new(TransformStep::new(
            "min:js",
            primary.join("javascripts"),
            &pats(&["**/*.js"]),
            &[vendor_js_glob],
            minify_js,
            dests("javascripts"),
        )?);

        let min_css = Arc::new(TransformStep::new(
            "min:css",
            primary.join("stylesheets"),
            &pats(&["**/*.css"]),
            &[vendor_css_glob],
            minify_css,
            dests("stylesheets"),
        )?);

        let opt_images = Arc::new(TransformStep::new(
            "opt:images",
            primary.join("images"),
            &pats(&["**"]),
            &[],
            optimize_images,
            dests("images"),
        )?);

        Ok(Self {
            config,
            dest_roots,
            build_js,
            build_css,
            build_less,
            build_sass,
            copy_vendor_js,
            copy_vendor_css,
            copy_images,
            copy_fonts,
            copy_style_fonts,
            min_js,
            min_css,
            opt_images,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn dest_roots(&self) -> &[PathBuf] {
        &self.dest_roots
    }

    /// Every step, in phase order. Used for dry-run listings and cache
    /// clearing.
    pub fn all_steps(&self) -> Vec<Arc<TransformStep>> {
        let mut steps = self.copy_and_build_steps();
        steps.extend(self.minify_steps());
        steps
    }

    fn copy_and_build_steps(&self) -> Vec<Arc<TransformStep>> {
        vec![
            Arc::clone(&self.copy_vendor_js),
            Arc::clone(&self.copy_vendor_css),
            Arc::clone(&self.copy_images),
            Arc::clone(&self.copy_fonts),
            Arc::clone(&self.copy_style_fonts),
            Arc::clone(&self.build_js),
            Arc::clone(&self.build_css),
            Arc::clone(&self.build_less),
            Arc::clone(&self.build_sass),
        ]
    }

    fn minify_steps(&self) -> Vec<Arc<TransformStep>> {
        vec![
            Arc::clone(&self.min_js),
            Arc::clone(&self.min_css),
            Arc::clone(&self.opt_images),
        ]
    }

    /// Steps re-run when a file in the given watch group changes.
    pub(crate) fn steps_for_group(&self, group: WatchGroup) -> Vec<Arc<TransformStep>> {
        match group {
            WatchGroup::Scripts => vec![Arc::clone(&self.build_js)],
            WatchGroup::Styles => vec![
                Arc::clone(&self.build_css),
                Arc::clone(&self.build_less),
                Arc::clone(&self.build_sass),
            ],
            WatchGroup::Images => vec![Arc::clone(&self.copy_images)],
            WatchGroup::Fonts => vec![
                Arc::clone(&self.copy_fonts),
                Arc::clone(&self.copy_style_fonts),
            ],
        }
    }

    /// Remove every destination root, then drop all step caches so a rebuild
    /// re-writes every output.
    ///
    /// Idempotent: an already-absent root is not an error.
    pub async fn run_clean(&self) -> Result<()> {
        println!("[assetpipe] Cleaning destination roots...");
        for root in &self.dest_roots {
            match tokio::fs::remove_dir_all(root).await {
                Ok(()) => info!(root = ?root, "removed destination root"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(root = ?root, "destination root already absent");
                }
                Err(err) => return Err(err.into()),
            }
        }
        for step in self.all_steps() {
            step.clear_cache();
        }
        Ok(())
    }

    /// One-shot production build: clean, then every copy and transform step
    /// concurrently, then, only after all of those completed, the minify
    /// steps over the populated destination roots.
    pub async fn run_build(&self) -> Result<BuildReport> {
        self.run_clean().await?;
        println!("[assetpipe] Building for production...");

        let mut steps = run_steps(self.copy_and_build_steps()).await?;
        steps.extend(run_steps(self.minify_steps()).await?);

        let report = BuildReport { steps };
        info!(
            transformed = report.total_transformed(),
            cached = report.total_cached(),
            failed = report.total_failed(),
            written = report.total_written(),
            "build finished"
        );
        Ok(report)
    }

    /// Development loop: clean, one initial copy + transform pass (no
    /// minification), then install the watch dispatcher. Watchers stay
    /// active until the returned handle is dropped.
    pub async fn run_default(self: Arc<Self>) -> Result<WatcherHandle> {
        self.run_clean().await?;
        println!("[assetpipe] Building development assets...");
        run_steps(self.copy_and_build_steps()).await?;
        crate::watch::spawn_watcher(Arc::clone(&self))
    }
}

/// Run a set of steps concurrently and wait for all of them.
///
/// This is the only synchronization primitive in the pipeline: every handle
/// is awaited before any result is inspected, so the caller never observes a
/// partially-completed phase.
async fn run_steps(steps: Vec<Arc<TransformStep>>) -> Result<Vec<StepReport>> {
    let mut handles = Vec::with_capacity(steps.len());
    for step in steps {
        handles.push(tokio::task::spawn_blocking(move || step.run()));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await?);
    }

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        reports.push(result?);
    }
    Ok(reports)
}

fn tool_or_passthrough(
    name: &str,
    template: &Option<String>,
    browsers: &[String],
) -> Arc<dyn Transform> {
    match template {
        Some(t) => Arc::new(CommandTransform::with_browsers(name, t, browsers)),
        None => Arc::new(Passthrough::named(name)),
    }
}

fn pats(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
