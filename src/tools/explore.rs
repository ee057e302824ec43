//! Project overview: file sizes plus heuristic import/export lines for code files.
use crate::error::{Result, ToolError};
use crate::guard::{is_symlink, AllowedDirectories};
use crate::processor::relative_display;
use crate::search::null_as_default;
use crate::walker::{walk_dir, ExclusionRules, WalkOptions};
use byte_unit::{Byte, UnitType};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const CODE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "rs", "go", "java",
];
/// Larger files are listed but not read for imports/exports.
const MAX_SCAN_BYTES: u64 = 1024 * 1024;
const MAX_LINES_PER_KIND: usize = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest {
    pub directory: String,
    #[serde(default)]
    pub sub_directory: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleLines {
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

/// Line-prefix heuristics, not a parser.
pub fn extract_module_lines(content: &str) -> ModuleLines {
    let mut lines = ModuleLines::default();
    for line in content.lines().map(str::trim) {
        if line.starts_with("import ")
            || line.starts_with("from ")
            || line.starts_with("use ")
            || line.contains("require(")
        {
            if lines.imports.len() < MAX_LINES_PER_KIND {
                lines.imports.push(line.to_string());
            }
        } else if (line.starts_with("export ")
            || line.starts_with("pub ")
            || line.contains("module.exports")
            || line.contains("exports."))
            && lines.exports.len() < MAX_LINES_PER_KIND
        {
            lines.exports.push(line.to_string());
        }
    }
    lines
}

fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CODE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.1} {}", adjusted.get_value(), adjusted.get_unit())
}

pub fn explore(allowed: &AllowedDirectories, request: &ExploreRequest) -> Result<String> {
    let base = allowed.validate(&request.directory)?;
    let target = match &request.sub_directory {
        Some(sub) if !sub.trim().is_empty() => {
            allowed.validate(&base.join(sub.trim()).to_string_lossy())?
        }
        _ => base,
    };
    if is_symlink(&target) {
        return Err(ToolError::InvalidRequest(format!(
            "refusing to explore through a symbolic link: {}",
            target.display()
        )));
    }
    if !target.exists() {
        return Err(ToolError::NotFound(target));
    }
    if !target.is_dir() {
        return Err(ToolError::InvalidRequest(format!(
            "not a directory: {}",
            target.display()
        )));
    }
    let target = allowed.confine(&target)?;

    let options = WalkOptions {
        skip_hidden: !request.include_hidden,
        exclusions: ExclusionRules::new(&[], &[]),
        ..Default::default()
    };

    let mut body = String::new();
    let mut files = 0usize;
    let mut total = 0u64;
    for entry in walk_dir(&target, &options) {
        let path = entry.path();
        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                debug!("Cannot stat {}: {err}", path.display());
                continue;
            }
        };
        files += 1;
        total += size;

        let empty = if size == 0 { " (empty)" } else { "" };
        body.push_str(&format!(
            "{} ({}){empty}\n",
            relative_display(path, &target),
            format_size(size)
        ));

        if size == 0 || size > MAX_SCAN_BYTES || !is_code_file(path) {
            continue;
        }
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };
        let module = extract_module_lines(&content);
        if !module.imports.is_empty() {
            body.push_str("  imports:\n");
            for line in &module.imports {
                body.push_str(&format!("    {line}\n"));
            }
        }
        if !module.exports.is_empty() {
            body.push_str("  exports:\n");
            for line in &module.exports {
                body.push_str(&format!("    {line}\n"));
            }
        }
    }

    let mut out = format!("Project: {}\n", target.display());
    out.push_str(&format!("Files: {files}  Total size: {}\n\n", format_size(total)));
    if files == 0 {
        out.push_str("No files found\n");
    } else {
        out.push_str(&body);
    }
    Ok(out)
}
