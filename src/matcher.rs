use crate::error::Result;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Switches that shape how a user pattern is turned into a regex.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOptions {
    pub regex_mode: bool,
    pub case_sensitive: bool,
    pub word_boundary: bool,
    pub multiline: bool,
}

/// One occurrence of the pattern on a line.
///
/// Offsets and the snippet window are measured in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub line_number: usize,
    pub line_text: String,
    pub match_start: usize,
    pub match_end: usize,
    pub matched_text: String,
    pub snippet: String,
}

/// A pattern compiled once per request and reused for every line.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    source: String,
}

pub fn compile(pattern: &str, options: &PatternOptions) -> Result<CompiledPattern> {
    let mut source = if options.regex_mode {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    if options.word_boundary {
        source = format!(r"\b(?:{source})\b");
    }
    let regex = RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .multi_line(options.multiline)
        .build()?;
    Ok(CompiledPattern { regex, source })
}

impl CompiledPattern {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Every non-overlapping match on `line`, left to right.
    ///
    /// An empty match advances the scan by one character so the loop always ends.
    pub fn find_all(&self, line: &str, line_number: usize, radius: usize) -> Vec<MatchRecord> {
        let mut records = Vec::new();
        let mut pos = 0;
        while pos <= line.len() {
            let Some(m) = self.regex.find_at(line, pos) else {
                break;
            };
            records.push(self.record(line, line_number, m.start(), m.end(), radius));
            pos = if m.end() > m.start() {
                m.end()
            } else {
                m.end() + line[m.end()..].chars().next().map_or(1, char::len_utf8)
            };
        }
        records
    }

    fn record(
        &self,
        line: &str,
        line_number: usize,
        start: usize,
        end: usize,
        radius: usize,
    ) -> MatchRecord {
        let match_start = line[..start].chars().count();
        let match_end = match_start + line[start..end].chars().count();
        MatchRecord {
            line_number,
            line_text: line.to_string(),
            match_start,
            match_end,
            matched_text: line[start..end].to_string(),
            snippet: snippet(line, match_start, match_end, radius).to_string(),
        }
    }
}

/// `line[max(0, start - radius) .. min(len, end + radius)]`, by characters.
pub fn snippet(line: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = char_to_byte(line, start.saturating_sub(radius));
    let to = char_to_byte(line, end.saturating_add(radius));
    &line[from..to]
}

fn char_to_byte(line: &str, char_idx: usize) -> usize {
    line.char_indices()
        .nth(char_idx)
        .map_or(line.len(), |(byte, _)| byte)
}
