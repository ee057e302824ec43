//! The tool surface: argument parsing and dispatch by tool name
pub mod delete;
pub mod explore;
pub mod outdated;
pub mod rename;
pub mod schema;

use crate::config::Config;
use crate::error::{Result, ToolError};
use crate::guard::AllowedDirectories;
use crate::metrics::Metrics;
use crate::search::{SearchEngine, SearchRequest};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const SEARCH_FILES: &str = "search_files";
pub const RENAME_FILE: &str = "rename_file";
pub const DELETE_FILE: &str = "delete_file";
pub const EXPLORE_PROJECT: &str = "explore_project";
pub const CHECK_OUTDATED: &str = "check_outdated";
pub const LIST_ALLOWED_DIRECTORIES: &str = "list_allowed_directories";

/// Shared, read-only state handed to every tool call.
#[derive(Clone)]
pub struct ToolContext {
    pub allowed: AllowedDirectories,
    pub config: Arc<Config>,
    pub metrics: Arc<Metrics>,
    engine: Arc<SearchEngine>,
}

impl ToolContext {
    pub fn new(allowed: AllowedDirectories, config: Config, metrics: Arc<Metrics>) -> Self {
        let engine = SearchEngine::new(allowed.clone(), config.search.clone(), metrics.clone());
        Self {
            allowed,
            config: Arc::new(config),
            metrics,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }
}

/// Decodes a tool's argument object; `null` counts as "no arguments".
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| ToolError::InvalidRequest(format!("invalid arguments for {tool}: {e}")))
}

/// Runs the named tool and returns its text payload.
pub async fn call_tool(ctx: &ToolContext, name: &str, args: Value) -> Result<String> {
    ctx.metrics.tool_calls.inc();
    debug!("Tool call: {name}");
    let result = dispatch(ctx, name, args).await;
    if let Err(err) = &result {
        ctx.metrics.tool_errors.inc();
        warn!("Tool {name} failed: {err}");
    }
    result
}

async fn dispatch(ctx: &ToolContext, name: &str, args: Value) -> Result<String> {
    match name {
        SEARCH_FILES => {
            let request: SearchRequest = parse_args(name, args)?;
            let engine = ctx.engine.clone();
            tokio::task::spawn_blocking(move || engine.execute(&request))
                .await
                .map_err(|e| ToolError::Other(format!("search task failed: {e}")))?
        }
        RENAME_FILE => {
            let response = rename::rename(&ctx.allowed, &parse_args(name, args)?)?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        DELETE_FILE => {
            let response = delete::delete(&ctx.allowed, &parse_args(name, args)?)?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        EXPLORE_PROJECT => {
            let request: explore::ExploreRequest = parse_args(name, args)?;
            let allowed = ctx.allowed.clone();
            tokio::task::spawn_blocking(move || explore::explore(&allowed, &request))
                .await
                .map_err(|e| ToolError::Other(format!("explore task failed: {e}")))?
        }
        CHECK_OUTDATED => {
            let request: outdated::OutdatedRequest = parse_args(name, args)?;
            let response = outdated::check_outdated(&ctx.allowed, &ctx.config.outdated, &request).await?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        LIST_ALLOWED_DIRECTORIES => Ok(list_allowed(&ctx.allowed)),
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

pub fn list_allowed(allowed: &AllowedDirectories) -> String {
    let lines: Vec<String> = allowed
        .roots()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    format!("Allowed directories:\n{}", lines.join("\n"))
}
