// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from `assetpipe.toml`.
///
/// Every field is optional with defaults matching the conventional project
/// layout:
///
/// ```toml
/// root = "."
/// dest_roots = ["public", "target/web/public/main"]
/// browsers = ["ie >= 9"]
///
/// [vendor]
/// js = "plugins"
/// css = "plugins"
///
/// [tools]
/// minify_js = "uglifyjs"
/// prefix = "autoprefixer --browsers '{browsers}'"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Project root; the `assets/` source tree and all destination roots are
    /// resolved beneath it.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Destination roots, each receiving a byte-identical output tree.
    /// Relative paths are resolved under `root`.
    #[serde(default = "default_dest_roots")]
    pub dest_roots: Vec<PathBuf>,

    /// Vendor subdirectory names, excluded from transforms and copied
    /// verbatim instead.
    #[serde(default)]
    pub vendor: VendorConfig,

    /// Browser support rules passed through to prefixing/minification tools.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// Optional external commands per transform seam.
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_dest_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from("public"),
        PathBuf::from("target/web/public/main"),
    ]
}

fn default_browsers() -> Vec<String> {
    vec!["ie >= 9".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            dest_roots: default_dest_roots(),
            vendor: VendorConfig::default(),
            browsers: default_browsers(),
            tools: ToolsConfig::default(),
        }
    }
}

/// `[vendor]` section.
///
/// Each field names one subdirectory under the matching asset source root
/// (`assets/javascripts/<js>`, `assets/stylesheets/<css>`). A bare directory
/// name, not a path.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    #[serde(default = "default_vendor_segment")]
    pub js: String,

    #[serde(default = "default_vendor_segment")]
    pub css: String,
}

fn default_vendor_segment() -> String {
    "plugins".to_string()
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            js: default_vendor_segment(),
            css: default_vendor_segment(),
        }
    }
}

/// `[tools]` section: external command per transform seam.
///
/// Commands receive the file on stdin and must emit the transformed file on
/// stdout. `{browsers}` in a template is replaced with the comma-joined
/// `browsers` list. Unset seams fall back to the conservative built-ins
/// (pass-through for transpile/preprocess/prefix/optimize, comment and
/// whitespace stripping for the minifiers).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub transpile: Option<String>,

    #[serde(default)]
    pub preprocess_less: Option<String>,

    #[serde(default)]
    pub preprocess_sass: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub minify_js: Option<String>,

    #[serde(default)]
    pub minify_css: Option<String>,

    #[serde(default)]
    pub optimize_images: Option<String>,
}

impl BuildConfig {
    /// Destination roots resolved under `root`.
    pub fn resolved_dest_roots(&self) -> Vec<PathBuf> {
        self.dest_roots
            .iter()
            .map(|d| if d.is_absolute() { d.clone() } else { self.root.join(d) })
            .collect()
    }

    /// The `assets/` source tree under `root`.
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }
}
