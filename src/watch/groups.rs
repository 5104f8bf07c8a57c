// src/watch/groups.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;

/// The four glob groups the dispatcher maps change events onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchGroup {
    Scripts,
    Styles,
    Images,
    Fonts,
}

impl fmt::Display for WatchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WatchGroup::Scripts => "Scripts",
            WatchGroup::Styles => "Styles",
            WatchGroup::Images => "Images",
            WatchGroup::Fonts => "Fonts",
        };
        f.write_str(s)
    }
}

/// Compiled glob sets for every group, matched against paths relative to the
/// `assets/` directory.
#[derive(Debug)]
pub struct WatchGroups {
    scripts: GlobSet,
    styles: GlobSet,
    images: GlobSet,
    fonts: GlobSet,
}

impl WatchGroups {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scripts: build_globset(&["javascripts/**/*.js"])?,
            styles: build_globset(&[
                "stylesheets/**/*.css",
                "stylesheets/**/*.less",
                "stylesheets/**/*.scss",
            ])?,
            images: build_globset(&["images/**"])?,
            fonts: build_globset(&["fonts/**", "stylesheets/fonts/**"])?,
        })
    }

    /// Every group interested in the given assets-relative path.
    pub fn classify(&self, rel_path: &str) -> Vec<WatchGroup> {
        let mut groups = Vec::new();
        if self.scripts.is_match(rel_path) {
            groups.push(WatchGroup::Scripts);
        }
        if self.styles.is_match(rel_path) {
            groups.push(WatchGroup::Styles);
        }
        if self.images.is_match(rel_path) {
            groups.push(WatchGroup::Images);
        }
        if self.fonts.is_match(rel_path) {
            groups.push(WatchGroup::Fonts);
        }
        groups
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}
