use crate::error::{Result, ToolError};
use crate::matcher::{CompiledPattern, MatchRecord};
use crate::preprocess::preprocess;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

const BINARY_CHECK_SIZE: usize = 1024;

/// All matches found in one file. Only built when there is at least one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub matches: Vec<MatchRecord>,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub extension: String,
}

impl FileResult {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn first_line(&self) -> Option<usize> {
        self.matches.first().map(|m| m.line_number)
    }
}

/// Per-request settings for scanning a single file.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub pattern: &'a CompiledPattern,
    pub snippet_radius: usize,
    pub include_binary: bool,
    pub strip_comments: bool,
    pub strip_strings: bool,
}

/// Null byte anywhere in the leading block marks the content as binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(BINARY_CHECK_SIZE)];
    memchr::memchr(0, head).is_some()
}

/// Reads `path` and runs the pattern over every line.
///
/// `Ok(None)` means the file was skipped (binary, undecodable) or had no matches.
pub fn scan_file(
    path: &Path,
    root: &Path,
    metadata: &Metadata,
    options: &ScanOptions<'_>,
) -> Result<Option<FileResult>> {
    let bytes = fs::read(path).map_err(ToolError::at(path))?;

    if !options.include_binary && is_binary(&bytes) {
        debug!("Skipping binary file: {}", path.display());
        return Ok(None);
    }

    let text = if options.include_binary {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                debug!("Skipping file that is not valid UTF-8: {}", path.display());
                return Ok(None);
            }
        }
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let content = preprocess(
        &text,
        options.strip_comments,
        options.strip_strings,
        &extension,
    );

    let matches: Vec<MatchRecord> = content
        .lines()
        .enumerate()
        .flat_map(|(i, line)| options.pattern.find_all(line, i + 1, options.snippet_radius))
        .collect();

    if matches.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileResult {
        absolute_path: path.to_path_buf(),
        relative_path: relative_display(path, root),
        matches,
        size_bytes: metadata.len(),
        last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        extension,
    }))
}

/// `path` relative to `root` with forward slashes; the file name if `path` is the root.
pub fn relative_display(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        _ => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}
