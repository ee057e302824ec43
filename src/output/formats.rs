//! Individual output format implementations
use crate::error::Result;
use crate::output::{OutputFormatterTrait, RenderOptions};
use crate::processor::FileResult;
use crate::search::SearchReport;
use serde::Serialize;
use std::path::Path;

fn no_matches(report: &SearchReport) -> String {
    format!(
        "No matches found for \"{}\" in {}\n",
        report.pattern,
        report.root.display()
    )
}

fn header(report: &SearchReport) -> String {
    format!(
        "Found {} match(es) in {} file(s) for \"{}\"\n",
        report.total_matches, report.total_files, report.pattern
    )
}

/// Walks matches in result order, stopping after `cap` entries in total.
fn capped_matches<'a>(
    report: &'a SearchReport,
) -> impl Iterator<Item = (&'a FileResult, &'a crate::matcher::MatchRecord)> + 'a {
    report
        .results
        .iter()
        .flat_map(|file| file.matches.iter().map(move |m| (file, m)))
        .take(report.cap)
}

fn flat_notice(out: &mut String, report: &SearchReport, emitted: usize) {
    if emitted < report.total_matches {
        out.push_str(&format!(
            "\n[Results truncated: showing {emitted} of {} matches (maxResults = {})]\n",
            report.total_matches, report.cap
        ));
    }
}

fn grouped_notice(out: &mut String, report: &SearchReport) {
    if report.results.len() < report.total_files {
        out.push_str(&format!(
            "[Results truncated: showing {} of {} files (maxResults = {})]\n",
            report.results.len(),
            report.total_files,
            report.cap
        ));
    }
}

/// Text formatter (default)
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatterTrait for TextFormatter {
    fn format(&self, report: &SearchReport, options: &RenderOptions) -> Result<String> {
        if report.results.is_empty() {
            return Ok(no_matches(report));
        }
        let mut out = header(report);
        out.push('\n');

        if options.group_by_file {
            for file in &report.results {
                out.push_str(&format!("{} ({} match(es))\n", file.relative_path, file.match_count()));
                for m in file.matches.iter().take(options.grouped_match_limit) {
                    out.push_str(&format!("  {}: {}\n", m.line_number, m.snippet.trim()));
                }
                if file.match_count() > options.grouped_match_limit {
                    out.push_str(&format!(
                        "  ... +{} more\n",
                        file.match_count() - options.grouped_match_limit
                    ));
                }
                out.push('\n');
            }
            grouped_notice(&mut out, report);
        } else {
            let mut emitted = 0;
            for (file, m) in capped_matches(report) {
                out.push_str(&format!(
                    "{}:{}: {}\n",
                    file.relative_path,
                    m.line_number,
                    m.snippet.trim()
                ));
                emitted += 1;
            }
            flat_notice(&mut out, report, emitted);
        }

        Ok(out)
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Line-oriented format with explicit columns and file metadata
pub struct StructuredFormatter;

impl StructuredFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StructuredFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatterTrait for StructuredFormatter {
    fn format(&self, report: &SearchReport, options: &RenderOptions) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!("pattern: \"{}\"\n", report.pattern));
        out.push_str(&format!("root: {}\n", report.root.display()));
        out.push_str(&format!(
            "files: {} of {}  matches: {}\n",
            report.results.len(),
            report.total_files,
            report.total_matches
        ));
        out.push_str(&format!(
            "scanned: {}  skipped: {}  elapsed: {}ms\n",
            report.stats.files_scanned, report.stats.files_skipped, report.stats.elapsed_ms
        ));
        if report.results.is_empty() {
            out.push_str("\nno matches\n");
            return Ok(out);
        }
        out.push('\n');

        if options.group_by_file {
            for file in &report.results {
                let modified = file
                    .last_modified
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string());
                out.push_str(&format!(
                    "== {} [size={} bytes, modified={}, ext={}, matches={}]\n",
                    file.relative_path,
                    file.size_bytes,
                    modified,
                    display_ext(&file.extension),
                    file.match_count()
                ));
                for m in file.matches.iter().take(options.grouped_match_limit) {
                    out.push_str(&format!(
                        "  L{}:C{}-{} | {}\n",
                        m.line_number,
                        m.match_start,
                        m.match_end,
                        m.snippet.trim()
                    ));
                }
                if file.match_count() > options.grouped_match_limit {
                    out.push_str(&format!(
                        "  ... +{} more\n",
                        file.match_count() - options.grouped_match_limit
                    ));
                }
            }
            out.push('\n');
            grouped_notice(&mut out, report);
        } else {
            let mut emitted = 0;
            for (file, m) in capped_matches(report) {
                out.push_str(&format!(
                    "{}:{}:{}-{}: {}\n",
                    file.relative_path,
                    m.line_number,
                    m.match_start,
                    m.match_end,
                    m.snippet.trim()
                ));
                emitted += 1;
            }
            flat_notice(&mut out, report, emitted);
        }

        Ok(out)
    }

    fn name(&self) -> &str {
        "structured"
    }
}

fn display_ext(ext: &str) -> &str {
    if ext.is_empty() {
        "none"
    } else {
        ext
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    pattern: &'a str,
    root: &'a Path,
    total_files: usize,
    total_matches: usize,
    shown_files: usize,
    shown_matches: usize,
    truncated: bool,
    results: &'a [FileResult],
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatterTrait for JsonFormatter {
    fn format(&self, report: &SearchReport, _options: &RenderOptions) -> Result<String> {
        let body = JsonReport {
            pattern: &report.pattern,
            root: &report.root,
            total_files: report.total_files,
            total_matches: report.total_matches,
            shown_files: report.results.len(),
            shown_matches: report.shown_matches(),
            truncated: report.results.len() < report.total_files,
            results: &report.results,
        };
        let text = if self.pretty {
            serde_json::to_string_pretty(&body)?
        } else {
            serde_json::to_string(&body)?
        };
        Ok(text)
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchRecord;
    use crate::search::SearchStats;
    use std::path::PathBuf;

    fn file(path: &str, count: usize) -> FileResult {
        FileResult {
            absolute_path: PathBuf::from("/data").join(path),
            relative_path: path.to_string(),
            matches: (1..=count)
                .map(|line| MatchRecord {
                    line_number: line,
                    line_text: format!("  hit {line}"),
                    match_start: 2,
                    match_end: 5,
                    matched_text: "hit".to_string(),
                    snippet: format!("  hit {line}"),
                })
                .collect(),
            size_bytes: 42,
            last_modified: None,
            extension: "txt".to_string(),
        }
    }

    fn report(results: Vec<FileResult>, total_files: usize, cap: usize) -> SearchReport {
        let total_matches = results.iter().map(FileResult::match_count).sum();
        SearchReport {
            pattern: "hit".to_string(),
            root: PathBuf::from("/data"),
            results,
            total_files,
            total_matches,
            cap,
            stats: SearchStats::default(),
        }
    }

    fn flat() -> RenderOptions {
        RenderOptions {
            group_by_file: false,
            ..Default::default()
        }
    }

    #[test]
    fn grouped_text_limits_matches_per_file() {
        let out = TextFormatter::new()
            .format(&report(vec![file("a.txt", 12)], 1, 100), &RenderOptions::default())
            .unwrap();
        assert!(out.starts_with("Found 12 match(es) in 1 file(s) for \"hit\""));
        assert!(out.contains("a.txt (12 match(es))"));
        assert!(out.contains("  10: hit 10"));
        assert!(!out.contains("  11: hit 11"));
        assert!(out.contains("... +2 more"));
    }

    #[test]
    fn flat_text_caps_globally_with_notice() {
        let out = TextFormatter::new()
            .format(&report(vec![file("a.txt", 3), file("b.txt", 3)], 2, 4), &flat())
            .unwrap();
        let lines: Vec<_> = out.lines().filter(|l| l.contains(".txt:")).collect();
        assert_eq!(lines, vec!["a.txt:1: hit 1", "a.txt:2: hit 2", "a.txt:3: hit 3", "b.txt:1: hit 1"]);
        assert!(out.contains("[Results truncated: showing 4 of 6 matches"));
    }

    #[test]
    fn flat_text_without_truncation_has_no_notice() {
        let out = TextFormatter::new()
            .format(&report(vec![file("a.txt", 2)], 1, 100), &flat())
            .unwrap();
        assert!(!out.contains("truncated"));
    }

    #[test]
    fn empty_report_says_so() {
        let out = TextFormatter::new()
            .format(&report(vec![], 0, 100), &RenderOptions::default())
            .unwrap();
        assert_eq!(out, "No matches found for \"hit\" in /data\n");
    }

    #[test]
    fn structured_includes_columns_and_metadata() {
        let out = StructuredFormatter::new()
            .format(&report(vec![file("a.txt", 1)], 3, 1), &RenderOptions::default())
            .unwrap();
        assert!(out.contains("files: 1 of 3  matches: 1"));
        assert!(out.contains("== a.txt [size=42 bytes, modified=unknown, ext=txt, matches=1]"));
        assert!(out.contains("L1:C2-5 | hit 1"));
        assert!(out.contains("showing 1 of 3 files"));
    }

    #[test]
    fn json_contains_only_capped_results() {
        let out = JsonFormatter::compact()
            .format(&report(vec![file("a.txt", 1)], 5, 1), &RenderOptions::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["totalFiles"], 5);
        assert_eq!(value["truncated"], true);
        assert_eq!(value["results"][0]["relativePath"], "a.txt");
        assert_eq!(value["results"][0]["matches"][0]["lineNumber"], 1);
    }
}
