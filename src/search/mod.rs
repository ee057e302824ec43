//! Content search across an allow-listed directory tree
pub mod aggregate;

use crate::config::SearchDefaults;
use crate::error::{Result, ToolError};
use crate::filter::FileFilter;
use crate::guard::{is_symlink, AllowedDirectories};
use crate::matcher::{compile, PatternOptions};
use crate::metrics::Metrics;
use crate::output::{self, OutputFormat, RenderOptions};
use crate::processor::{scan_file, FileResult, ScanOptions};
use crate::walker::{walk_dir, ExclusionRules, WalkOptions};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub use aggregate::{aggregate, sort_results, SortKey};

/// Pattern used when the caller gives none; always interpreted as a regex.
pub const MATCH_ALL: &str = ".*";

/// Arguments of one `search_files` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub pattern: Option<String>,
    pub search_path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub extensions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub exclude_extensions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub exclude_patterns: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub regex_mode: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub case_sensitive: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub word_boundary: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub multiline: bool,
    pub max_depth: Option<usize>,
    #[serde(deserialize_with = "null_as_default")]
    pub follow_symlinks: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub include_binary: bool,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    #[serde(deserialize_with = "de_timestamp")]
    pub modified_after: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_timestamp")]
    pub modified_before: Option<DateTime<Utc>>,
    pub snippet_length: Option<usize>,
    pub max_results: Option<usize>,
    #[serde(deserialize_with = "null_as_default")]
    pub sort_by: SortKey,
    pub group_by_file: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub exclude_comments: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub exclude_strings: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub output_format: OutputFormat,
}

impl SearchRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Default::default()
        }
    }

    fn pattern_options(&self) -> (&str, PatternOptions) {
        let (pattern, regex_mode) = match &self.pattern {
            Some(p) => (p.as_str(), self.regex_mode),
            None => (MATCH_ALL, true),
        };
        (
            pattern,
            PatternOptions {
                regex_mode,
                case_sensitive: self.case_sensitive,
                word_boundary: self.word_boundary,
                multiline: self.multiline,
            },
        )
    }
}

/// `null` reads as the field's default, the same as leaving the field out.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub elapsed_ms: u128,
}

/// Everything a formatter needs: capped, ordered results plus the pre-cap totals.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub pattern: String,
    pub root: PathBuf,
    pub results: Vec<FileResult>,
    pub total_files: usize,
    pub total_matches: usize,
    pub cap: usize,
    pub stats: SearchStats,
}

impl SearchReport {
    pub fn shown_matches(&self) -> usize {
        self.results.iter().map(FileResult::match_count).sum()
    }
}

pub struct SearchEngine {
    allowed: AllowedDirectories,
    defaults: SearchDefaults,
    metrics: Arc<Metrics>,
}

impl SearchEngine {
    pub fn new(allowed: AllowedDirectories, defaults: SearchDefaults, metrics: Arc<Metrics>) -> Self {
        Self {
            allowed,
            defaults,
            metrics,
        }
    }

    /// Runs the search and renders it in the requested format.
    pub fn execute(&self, request: &SearchRequest) -> Result<String> {
        let report = self.search(request)?;
        output::render(
            &report,
            request.output_format,
            &RenderOptions {
                group_by_file: request.group_by_file.unwrap_or(true),
                grouped_match_limit: self.defaults.grouped_match_limit,
            },
        )
    }

    /// Validates, walks, matches and aggregates. Nothing is read before the root passes the guard.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchReport> {
        let start = Instant::now();
        let root = match &request.search_path {
            Some(raw) => self.allowed.validate(raw)?,
            None => self.allowed.primary().to_path_buf(),
        };

        let cap = request.max_results.unwrap_or(self.defaults.max_results);
        if cap == 0 {
            return Err(ToolError::InvalidParams(
                "maxResults must be a positive integer".to_string(),
            ));
        }
        let radius = request.snippet_length.unwrap_or(self.defaults.snippet_length);

        let (pattern, pattern_options) = request.pattern_options();
        let compiled = compile(pattern, &pattern_options)?;
        debug!("Compiled pattern: {}", compiled.as_str());

        if !request.follow_symlinks && is_symlink(&root) {
            return Err(ToolError::InvalidRequest(format!(
                "search path is a symbolic link: {} (set followSymlinks to search through it)",
                root.display()
            )));
        }
        if !root.exists() {
            return Err(ToolError::NotFound(root));
        }
        if !root.is_dir() {
            return Err(ToolError::InvalidRequest(format!(
                "search path is not a directory: {}",
                root.display()
            )));
        }
        let root = self.allowed.confine(&root)?;

        info!(
            "Searching {} for {:?} (regex: {}, sort: {})",
            root.display(),
            pattern,
            pattern_options.regex_mode,
            request.sort_by
        );

        let walk_options = WalkOptions {
            max_depth: request.max_depth,
            follow_symlinks: request.follow_symlinks,
            skip_hidden: false,
            exclusions: ExclusionRules::new(
                &self.defaults.extra_excluded_dirs,
                &request.exclude_patterns,
            ),
        };
        let filter = FileFilter::new()
            .size_range(request.min_size, request.max_size)
            .modified_range(request.modified_after, request.modified_before)
            .extensions(&request.extensions)
            .exclude_extensions(&request.exclude_extensions);
        let scan_options = ScanOptions {
            pattern: &compiled,
            snippet_radius: radius,
            include_binary: request.include_binary,
            strip_comments: request.exclude_comments,
            strip_strings: request.exclude_strings,
        };

        let mut stats = SearchStats::default();
        let mut results = Vec::new();
        for entry in walk_dir(&root, &walk_options) {
            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!("Cannot stat {}: {err}", path.display());
                    stats.files_skipped += 1;
                    continue;
                }
            };
            if !filter.admit(&metadata, path) {
                continue;
            }
            stats.files_scanned += 1;
            match scan_file(path, &root, &metadata, &scan_options) {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(err) => {
                    warn!("Skipping unreadable file: {err}");
                    stats.files_skipped += 1;
                }
            }
        }

        let total_files = results.len();
        let total_matches: usize = results.iter().map(FileResult::match_count).sum();
        let results = aggregate(results, request.sort_by, cap);
        stats.elapsed_ms = start.elapsed().as_millis();

        self.metrics.files_scanned.inc_by(stats.files_scanned as u64);
        self.metrics.files_skipped.inc_by(stats.files_skipped as u64);
        self.metrics.matches_found.inc_by(total_matches as u64);
        debug!(
            "Search finished in {}ms: {} files scanned, {} skipped, {} matches in {} files",
            stats.elapsed_ms, stats.files_scanned, stats.files_skipped, total_matches, total_files
        );

        Ok(SearchReport {
            pattern: pattern.to_string(),
            root,
            results,
            total_files,
            total_matches,
            cap,
            stats,
        })
    }
}
