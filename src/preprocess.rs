//! Lexical comment and string-literal stripping applied before matching.
//!
//! These are regex heuristics, not tokenizers: a quote inside a comment or a
//! `//` inside a string literal can be misread. Removed regions keep their
//! line breaks so reported line numbers still point at the original file.
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

lazy_static! {
    static ref LINE_SLASH_COMMENT: Regex = Regex::new(r"(?m)//.*$").unwrap();
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
    static ref HASH_COMMENT: Regex = Regex::new(r"(?m)#.*$").unwrap();
    static ref MARKUP_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref STRING_LITERAL: Regex =
        Regex::new(r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\.)*`"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `// line` and `/* block */`
    CFamily,
    /// `/* block */` only
    Block,
    /// `# line`
    Hash,
    /// `<!-- block -->`
    Markup,
    None,
}

impl CommentStyle {
    pub fn for_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "c" | "h" | "cc" | "cpp" | "cxx"
            | "hpp" | "cs" | "java" | "go" | "rs" | "swift" | "kt" | "kts" | "scala"
            | "dart" | "php" => CommentStyle::CFamily,
            "css" | "scss" | "less" => CommentStyle::Block,
            "py" | "sh" | "bash" | "zsh" | "rb" | "pl" | "r" | "yaml" | "yml" | "toml"
            | "ps1" => CommentStyle::Hash,
            "html" | "htm" | "xml" | "svg" | "vue" | "md" => CommentStyle::Markup,
            _ => CommentStyle::None,
        }
    }
}

/// Returns `text` with comments and/or string contents removed.
pub fn preprocess<'a>(
    text: &'a str,
    strip_comments: bool,
    strip_strings: bool,
    extension: &str,
) -> Cow<'a, str> {
    let mut out = Cow::Borrowed(text);
    if strip_comments {
        out = strip_comments_for(out, CommentStyle::for_extension(extension));
    }
    if strip_strings {
        out = replace(out, &STRING_LITERAL, |caps| {
            let literal = &caps[0];
            let quote = &literal[..1];
            format!("{quote}{quote}{}", newlines_in(literal))
        });
    }
    out
}

fn strip_comments_for(text: Cow<'_, str>, style: CommentStyle) -> Cow<'_, str> {
    match style {
        CommentStyle::CFamily => {
            let text = replace(text, &BLOCK_COMMENT, |caps| newlines_in(&caps[0]));
            replace(text, &LINE_SLASH_COMMENT, |_| String::new())
        }
        CommentStyle::Block => replace(text, &BLOCK_COMMENT, |caps| newlines_in(&caps[0])),
        CommentStyle::Hash => replace(text, &HASH_COMMENT, |_| String::new()),
        CommentStyle::Markup => replace(text, &MARKUP_COMMENT, |caps| newlines_in(&caps[0])),
        CommentStyle::None => text,
    }
}

fn replace<'a, F>(text: Cow<'a, str>, re: &Regex, rep: F) -> Cow<'a, str>
where
    F: Fn(&Captures) -> String,
{
    let replaced = match re.replace_all(&text, |caps: &Captures| rep(caps)) {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };
    match replaced {
        Some(s) => Cow::Owned(s),
        None => text,
    }
}

fn newlines_in(s: &str) -> String {
    "\n".repeat(s.matches('\n').count())
}
