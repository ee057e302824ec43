use chrono::{DateTime, Utc};
use log::debug;
use std::fs::Metadata;
use std::path::Path;

/// Per-file admission test applied after exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub modified_after: Option<DateTime<Utc>>,
    pub modified_before: Option<DateTime<Utc>>,
    extensions: Option<Vec<String>>,
    exclude_extensions: Vec<String>,
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub fn modified_range(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.modified_after = after;
        self.modified_before = before;
        self
    }

    /// An empty list behaves like no list: every extension passes.
    pub fn extensions(mut self, extensions: &[String]) -> Self {
        let normalized: Vec<String> = extensions.iter().filter_map(|e| normalize_ext(e)).collect();
        self.extensions = (!normalized.is_empty()).then_some(normalized);
        self
    }

    pub fn exclude_extensions(mut self, extensions: &[String]) -> Self {
        self.exclude_extensions = extensions.iter().filter_map(|e| normalize_ext(e)).collect();
        self
    }

    pub fn admit(&self, metadata: &Metadata, path: &Path) -> bool {
        self.admit_size(metadata.len())
            && self.admit_modified(metadata.modified().ok().map(DateTime::<Utc>::from))
            && self.admit_extension(path)
    }

    fn admit_size(&self, size: u64) -> bool {
        if self.min_size.is_some_and(|min| size < min) {
            return false;
        }
        !self.max_size.is_some_and(|max| size > max)
    }

    fn admit_modified(&self, modified: Option<DateTime<Utc>>) -> bool {
        if self.modified_after.is_none() && self.modified_before.is_none() {
            return true;
        }
        let Some(modified) = modified else {
            return false;
        };
        if self.modified_after.is_some_and(|after| modified < after) {
            return false;
        }
        !self.modified_before.is_some_and(|before| modified > before)
    }

    fn admit_extension(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        if let Some(ext) = &ext {
            if self.exclude_extensions.contains(ext) {
                debug!("Skipping excluded extension: {}", path.display());
                return false;
            }
        }

        match (&self.extensions, ext) {
            (None, _) => true,
            (Some(allowed), Some(ext)) => allowed.contains(&ext),
            (Some(_), None) => false,
        }
    }
}

fn normalize_ext(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    (!ext.is_empty()).then_some(ext)
}
