pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod guard;
pub mod matcher;
pub mod metrics;
pub mod output;
pub mod preprocess;
pub mod processor;
pub mod search;
pub mod server;
pub mod tools;
pub mod walker;

pub use crate::config::Config;
pub use crate::error::{ErrorKind, Result, ToolError};
pub use crate::guard::{is_allowed, AllowedDirectories};
pub use crate::matcher::{compile, CompiledPattern, MatchRecord, PatternOptions};
pub use crate::output::OutputFormat;
pub use crate::processor::FileResult;
pub use crate::search::{SearchEngine, SearchReport, SearchRequest, SortKey};
pub use crate::tools::{call_tool, ToolContext};
pub use clap::Parser;
