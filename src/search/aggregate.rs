//! Ordering and capping of per-file results
use crate::processor::FileResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Most matches first
    #[default]
    Relevance,
    /// Relative path, ascending
    File,
    /// First matching line, ascending
    LineNumber,
    /// Newest first
    Modified,
    /// Largest first
    Size,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Relevance => write!(f, "relevance"),
            SortKey::File => write!(f, "file"),
            SortKey::LineNumber => write!(f, "lineNumber"),
            SortKey::Modified => write!(f, "modified"),
            SortKey::Size => write!(f, "size"),
        }
    }
}

/// Stable sort: ties keep traversal order, so identical requests render identically.
pub fn sort_results(results: &mut [FileResult], key: SortKey) {
    match key {
        SortKey::Relevance => results.sort_by(|a, b| b.match_count().cmp(&a.match_count())),
        SortKey::File => results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path)),
        SortKey::LineNumber => {
            results.sort_by(|a, b| none_last(a.first_line(), b.first_line(), |x, y| x.cmp(&y)))
        }
        SortKey::Modified => results.sort_by(|a, b| {
            none_last(a.last_modified, b.last_modified, |x, y| y.cmp(&x))
        }),
        SortKey::Size => results.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes)),
    }
}

fn none_last<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts then keeps at most `cap` files.
pub fn aggregate(mut results: Vec<FileResult>, key: SortKey, cap: usize) -> Vec<FileResult> {
    sort_results(&mut results, key);
    results.truncate(cap);
    results
}
