use fsmcp::config::SearchDefaults;
use fsmcp::metrics::Metrics;
use fsmcp::output::OutputFormat;
use fsmcp::{AllowedDirectories, ErrorKind, SearchEngine, SearchRequest, SortKey, ToolError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn setup() -> (TempDir, SearchEngine) {
    let temp_dir = TempDir::new().unwrap();
    let allowed = AllowedDirectories::canonicalize([temp_dir.path()]).unwrap();
    let engine = SearchEngine::new(allowed, SearchDefaults::default(), Arc::new(Metrics::new()));
    (temp_dir, engine)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn files(report: &fsmcp::SearchReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|r| r.relative_path.clone())
        .collect()
}

#[test]
fn literal_match_reports_line_and_columns() {
    let (dir, engine) = setup();
    write(dir.path(), "notes.txt", "alpha\nbeta\n// TODO: fix this\n");

    let report = engine.search(&SearchRequest::new("TODO")).unwrap();
    assert_eq!(report.total_files, 1);
    assert_eq!(report.total_matches, 1);
    let m = &report.results[0].matches[0];
    assert_eq!(m.line_number, 3);
    assert_eq!((m.match_start, m.match_end), (3, 7));
    assert_eq!(m.matched_text, "TODO");
    assert_eq!(report.results[0].relative_path, "notes.txt");
}

#[test]
fn word_boundary_skips_partial_words() {
    let (dir, engine) = setup();
    write(dir.path(), "cats.txt", "concatenate cat category\n");

    let mut request = SearchRequest::new("cat");
    request.word_boundary = true;
    let report = engine.search(&request).unwrap();
    let matches = &report.results[0].matches;
    assert_eq!(matches.len(), 1);
    assert_eq!((matches[0].match_start, matches[0].match_end), (12, 15));
}

#[test]
fn depth_zero_stays_in_the_root() {
    let (dir, engine) = setup();
    write(dir.path(), "top.txt", "needle\n");
    write(dir.path(), "nested/deep.txt", "needle\n");

    let mut request = SearchRequest::new("needle");
    request.max_depth = Some(0);
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["top.txt"]);

    request.max_depth = Some(1);
    request.sort_by = SortKey::File;
    assert_eq!(
        files(&engine.search(&request).unwrap()),
        vec!["nested/deep.txt", "top.txt"]
    );
}

#[test]
fn built_in_and_user_exclusions_are_skipped() {
    let (dir, engine) = setup();
    write(dir.path(), "src/lib.rs", "needle\n");
    write(dir.path(), "node_modules/pkg/index.js", "needle\n");
    write(dir.path(), ".git/config", "needle\n");
    write(dir.path(), "fixtures/data.txt", "needle\n");
    write(dir.path(), "src/generated.min.js", "needle\n");

    let mut request = SearchRequest::new("needle");
    request.exclude_patterns = vec!["fixtures".to_string(), "*.min.js".to_string()];
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["src/lib.rs"]);
}

#[test]
fn exclude_extensions_win_over_extensions() {
    let (dir, engine) = setup();
    write(dir.path(), "a.rs", "needle\n");
    write(dir.path(), "b.txt", "needle\n");
    write(dir.path(), "c.md", "needle\n");

    let mut request = SearchRequest::new("needle");
    request.extensions = vec![".rs".to_string(), "TXT".to_string()];
    request.exclude_extensions = vec!["txt".to_string()];
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["a.rs"]);
}

#[test]
fn cap_truncates_files_and_text_says_so() {
    let (dir, engine) = setup();
    for i in 0..5 {
        write(dir.path(), &format!("f{i}.txt"), "needle\n");
    }

    let mut request = SearchRequest::new("needle");
    request.max_results = Some(2);
    let report = engine.search(&request).unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.total_files, 5);

    let text = engine.execute(&request).unwrap();
    assert!(text.starts_with("Found 5 match(es) in 5 file(s)"));
    assert!(text.contains("[Results truncated: showing 2 of 5 files (maxResults = 2)]"));

    request.group_by_file = Some(false);
    let flat = engine.execute(&request).unwrap();
    assert_eq!(flat.lines().filter(|l| l.contains(".txt:1:")).count(), 2);
    assert!(flat.contains("showing 2 of 5 matches"));
}

#[test]
fn json_output_holds_only_capped_results() {
    let (dir, engine) = setup();
    for i in 0..4 {
        write(dir.path(), &format!("f{i}.txt"), "needle\n");
    }

    let mut request = SearchRequest::new("needle");
    request.max_results = Some(3);
    request.output_format = OutputFormat::Json;
    let value: serde_json::Value = serde_json::from_str(&engine.execute(&request).unwrap()).unwrap();
    assert_eq!(value["results"].as_array().unwrap().len(), 3);
    assert_eq!(value["totalFiles"], 4);
    assert_eq!(value["truncated"], true);
}

#[test]
fn repeated_requests_render_identically() {
    let (dir, engine) = setup();
    write(dir.path(), "a.txt", "needle\nneedle\n");
    write(dir.path(), "b/c.txt", "needle\n");
    write(dir.path(), "b/d.txt", "needle\n");

    let request = SearchRequest::new("needle");
    assert_eq!(engine.execute(&request).unwrap(), engine.execute(&request).unwrap());
}

#[test]
fn every_result_lies_under_the_search_root() {
    let (dir, engine) = setup();
    write(dir.path(), "x/y/z.txt", "needle\n");
    write(dir.path(), "w.txt", "needle\n");

    let report = engine.search(&SearchRequest::new("needle")).unwrap();
    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert!(result.absolute_path.starts_with(&report.root));
    }
}

#[test]
fn search_path_outside_roots_is_denied() {
    let (_dir, engine) = setup();
    let mut request = SearchRequest::new("needle");
    request.search_path = Some("../".to_string());
    let err = engine.search(&request).unwrap_err();
    assert!(matches!(err, ToolError::AccessDenied(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[test]
fn invalid_regex_is_invalid_params() {
    let (dir, engine) = setup();
    write(dir.path(), "a.txt", "needle\n");
    let mut request = SearchRequest::new("(unclosed");
    request.regex_mode = true;
    let err = engine.search(&request).unwrap_err();
    assert!(matches!(err, ToolError::Regex(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidParams);
}

#[test]
fn zero_max_results_is_rejected() {
    let (_dir, engine) = setup();
    let mut request = SearchRequest::new("needle");
    request.max_results = Some(0);
    assert!(matches!(
        engine.search(&request).unwrap_err(),
        ToolError::InvalidParams(_)
    ));
}

#[test]
fn missing_search_path_is_not_found() {
    let (_dir, engine) = setup();
    let mut request = SearchRequest::new("needle");
    request.search_path = Some("does/not/exist".to_string());
    assert!(matches!(
        engine.search(&request).unwrap_err(),
        ToolError::NotFound(_)
    ));
}

#[test]
fn binary_files_need_include_binary() {
    let (dir, engine) = setup();
    fs::write(dir.path().join("blob.bin"), b"needle\x00\x01\x02").unwrap();

    let mut request = SearchRequest::new("needle");
    assert!(engine.search(&request).unwrap().results.is_empty());
    request.include_binary = true;
    assert_eq!(engine.search(&request).unwrap().results.len(), 1);
}

#[test]
fn comments_and_strings_can_be_ignored() {
    let (dir, engine) = setup();
    write(
        dir.path(),
        "main.rs",
        "// todo: comment\nlet msg = \"todo in string\";\nfn todo() {}\n",
    );

    let mut request = SearchRequest::new("todo");
    assert_eq!(engine.search(&request).unwrap().total_matches, 3);

    request.exclude_comments = true;
    request.exclude_strings = true;
    let report = engine.search(&request).unwrap();
    assert_eq!(report.total_matches, 1);
    assert_eq!(report.results[0].matches[0].line_number, 3);
}

#[test]
fn omitted_pattern_matches_every_line() {
    let (dir, engine) = setup();
    write(dir.path(), "a.txt", "one\ntwo\n");

    let request = SearchRequest::default();
    let report = engine.search(&request).unwrap();
    let lines: Vec<usize> = report.results[0]
        .matches
        .iter()
        .map(|m| m.line_number)
        .collect();
    assert!(lines.contains(&1) && lines.contains(&2));
}

#[test]
fn relevance_puts_busiest_file_first() {
    let (dir, engine) = setup();
    write(dir.path(), "a.txt", "needle\n");
    write(dir.path(), "b.txt", "needle needle\nneedle\n");

    let report = engine.search(&SearchRequest::new("needle")).unwrap();
    assert_eq!(files(&report), vec!["b.txt", "a.txt"]);
}

#[test]
fn size_filter_limits_candidates() {
    let (dir, engine) = setup();
    write(dir.path(), "small.txt", "needle\n");
    write(dir.path(), "large.txt", &format!("needle\n{}", "x".repeat(4096)));

    let mut request = SearchRequest::new("needle");
    request.max_size = Some(1024);
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["small.txt"]);
}

#[cfg(unix)]
#[test]
fn symlinked_search_root_cannot_leave_the_roots() {
    let (dir, engine) = setup();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.txt"), "needle\n").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    let mut request = SearchRequest::new("needle");
    request.search_path = Some("link".to_string());
    let err = engine.search(&request).unwrap_err();
    assert!(matches!(err, ToolError::InvalidRequest(_)));

    request.follow_symlinks = true;
    let err = engine.search(&request).unwrap_err();
    assert!(matches!(err, ToolError::AccessDenied(_)));
}

#[cfg(unix)]
#[test]
fn symlinked_search_root_inside_the_roots_needs_follow() {
    let (dir, engine) = setup();
    write(dir.path(), "real/a.txt", "needle\n");
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

    let mut request = SearchRequest::new("needle");
    request.search_path = Some("alias".to_string());
    assert!(engine.search(&request).is_err());

    request.follow_symlinks = true;
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["a.txt"]);
}

#[test]
fn huge_max_depth_means_unbounded() {
    let (dir, engine) = setup();
    write(dir.path(), "a/b/c/deep.txt", "needle\n");

    let mut request = SearchRequest::new("needle");
    request.max_depth = Some(usize::MAX);
    assert_eq!(files(&engine.search(&request).unwrap()), vec!["a/b/c/deep.txt"]);
}

#[cfg(unix)]
#[test]
fn unreadable_entries_are_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, engine) = setup();
    write(dir.path(), "open.txt", "needle\n");
    write(dir.path(), "locked_dir/inner.txt", "needle\n");
    write(dir.path(), "locked.txt", "needle\n");
    let locked_dir = dir.path().join("locked_dir");
    let locked_file = dir.path().join("locked.txt");
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o000)).unwrap();
    fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o000)).unwrap();

    let result = engine.search(&SearchRequest::new("needle"));

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
    fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o644)).unwrap();

    let report = result.unwrap();
    assert!(files(&report).contains(&"open.txt".to_string()));
}

#[test]
fn multiline_flag_reaches_the_matcher() {
    let (dir, engine) = setup();
    write(dir.path(), "main.rs", "pub fn helper() {}\nfn main() {}\n");

    let mut request = SearchRequest::new(r"^fn \w+");
    request.regex_mode = true;
    request.multiline = true;
    let report = engine.search(&request).unwrap();
    let lines: Vec<usize> = report.results[0]
        .matches
        .iter()
        .map(|m| m.line_number)
        .collect();
    assert_eq!(lines, vec![2]);
    assert_eq!(report.results[0].matches[0].matched_text, "fn main");
}
