use ignore::{DirEntry, WalkBuilder};
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::path::Path;
use std::sync::Arc;

/// Build, dependency and VCS directories that are never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".cache",
    "coverage",
];

#[derive(Debug, Clone)]
enum NameRule {
    Glob(Regex),
    Contains(String),
}

impl NameRule {
    fn parse(pattern: &str) -> Self {
        if pattern.contains('*') || pattern.contains('?') {
            if let Ok(re) = glob_to_regex(pattern) {
                return NameRule::Glob(re);
            }
        }
        NameRule::Contains(pattern.to_string())
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameRule::Glob(re) => re.is_match(name),
            NameRule::Contains(needle) => name.contains(needle.as_str()),
        }
    }
}

/// Base-name exclusion rules: fixed directory names plus caller patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    names: Vec<String>,
    rules: Vec<NameRule>,
}

impl ExclusionRules {
    /// Built-in exclusions plus `extra` names (exact match) and user `patterns`.
    pub fn new(extra: &[String], patterns: &[String]) -> Self {
        let mut names: Vec<String> = DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect();
        names.extend(extra.iter().cloned());
        Self {
            names,
            rules: patterns
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| NameRule::parse(p))
                .collect(),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.rules.iter().any(|r| r.matches(name))
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    source.push('$');
    RegexBuilder::new(&source).case_insensitive(true).build()
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Deepest directory level to scan; 0 scans only the root's direct children.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    pub exclusions: ExclusionRules,
}

/// Lazily yields the regular files under `root`, depth-first in file-name order.
///
/// Unreadable directories and broken entries are logged and skipped.
pub fn walk_dir(root: &Path, options: &WalkOptions) -> impl Iterator<Item = DirEntry> {
    let exclusions = Arc::new(options.exclusions.clone());
    let follow = options.follow_symlinks;
    let skip_hidden = options.skip_hidden;

    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(follow)
        .max_depth(options.max_depth.map(|d| d.saturating_add(1)))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !follow && entry.path_is_symlink() {
                debug!("Skipping symlink: {}", entry.path().display());
                return false;
            }
            let name = entry.file_name().to_string_lossy();
            if skip_hidden && name.starts_with('.') {
                return false;
            }
            if exclusions.is_excluded(&name) {
                debug!("Skipping excluded entry: {}", entry.path().display());
                return false;
            }
            true
        })
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
}
