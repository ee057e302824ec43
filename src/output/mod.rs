//! Rendering of search reports
pub mod formats;

use crate::error::Result;
use crate::search::SearchReport;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use formats::*;

/// Layout switches shared by every formatter.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub group_by_file: bool,
    pub grouped_match_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            group_by_file: true,
            grouped_match_limit: 10,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatterTrait: Send + Sync {
    fn format(&self, report: &SearchReport, options: &RenderOptions) -> Result<String>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Structured,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Structured => "structured",
        }
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatterTrait> {
        match self {
            Self::Text => Box::new(TextFormatter::new()),
            Self::Json => Box::new(JsonFormatter::new()),
            Self::Structured => Box::new(StructuredFormatter::new()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders an already-capped report.
pub fn render(report: &SearchReport, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    format.formatter().format(report, options)
}
