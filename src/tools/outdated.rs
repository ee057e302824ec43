//! Outdated-dependency check that shells out to the package manager.
//!
//! `npm outdated` exits 1 whenever something is outdated, so a non-zero exit
//! that still printed a JSON object is the normal "has outdated" result.
use crate::config::OutdatedConfig;
use crate::error::{Result, ToolError};
use crate::guard::AllowedDirectories;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Detailed,
    Summary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedRequest {
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default = "default_true")]
    pub include_dev_dependencies: bool,
    #[serde(default)]
    pub output_format: ReportFormat,
}

fn default_true() -> bool {
    true
}

impl Default for OutdatedRequest {
    fn default() -> Self {
        Self {
            project_path: None,
            include_dev_dependencies: true,
            output_format: ReportFormat::Detailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedPackage {
    pub name: String,
    pub current: Option<String>,
    pub latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wanted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedResponse {
    pub success: bool,
    pub has_outdated: bool,
    pub outdated_packages: Vec<OutdatedPackage>,
    pub total_outdated: usize,
    pub message: String,
}

/// Names declared under `devDependencies` in a `package.json` document.
pub fn dev_dependencies(manifest: &Value) -> HashSet<String> {
    manifest
        .get("devDependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

fn text_field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Turns `outdated --json` output into a package list, sorted by name.
pub fn parse_outdated(
    stdout: &str,
    dev: &HashSet<String>,
    include_dev: bool,
    format: ReportFormat,
) -> Result<Vec<OutdatedPackage>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Map<String, Value> = serde_json::from_str(stdout)?;
    let mut packages: Vec<OutdatedPackage> = parsed
        .into_iter()
        .filter(|(name, _)| include_dev || !dev.contains(name))
        .map(|(name, entry)| {
            // workspaces report one entry per dependent
            let entry = match entry {
                Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
                other => other,
            };
            let dependency_type = if dev.contains(&name) {
                "devDependencies"
            } else {
                "dependencies"
            };
            let detailed = format == ReportFormat::Detailed;
            OutdatedPackage {
                current: text_field(&entry, "current"),
                latest: text_field(&entry, "latest"),
                wanted: text_field(&entry, "wanted").filter(|_| detailed),
                location: text_field(&entry, "location").filter(|_| detailed),
                dependency_type: detailed.then(|| dependency_type.to_string()),
                name,
            }
        })
        .collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

pub async fn check_outdated(
    allowed: &AllowedDirectories,
    config: &OutdatedConfig,
    request: &OutdatedRequest,
) -> Result<OutdatedResponse> {
    let project = match &request.project_path {
        Some(raw) => allowed.validate(raw)?,
        None => allowed.primary().to_path_buf(),
    };
    let manifest_path = project.join("package.json");
    if !manifest_path.is_file() {
        return Err(ToolError::NotFound(manifest_path));
    }
    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(&manifest_path).map_err(ToolError::at(&manifest_path))?,
    )?;
    let dev = dev_dependencies(&manifest);

    let stdout = run_outdated(&project, config).await?;
    let packages = parse_outdated(
        &stdout,
        &dev,
        request.include_dev_dependencies,
        request.output_format,
    )?;

    let total = packages.len();
    let message = if total == 0 {
        "All packages are up to date".to_string()
    } else {
        format!("Found {total} outdated package(s)")
    };
    info!("Outdated check in {}: {message}", project.display());

    Ok(OutdatedResponse {
        success: true,
        has_outdated: total > 0,
        outdated_packages: packages,
        total_outdated: total,
        message,
    })
}

async fn run_outdated(project: &Path, config: &OutdatedConfig) -> Result<String> {
    let command_line = format!("{} outdated --json", config.command);
    debug!("Running `{command_line}` in {}", project.display());

    let child = Command::new(&config.command)
        .args(["outdated", "--json"])
        .current_dir(project)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(Duration::from_secs(config.timeout_secs), child).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            return Err(ToolError::Command {
                command: command_line,
                message: err.to_string(),
            })
        }
        Err(_) => {
            return Err(ToolError::Timeout {
                command: command_line,
                secs: config.timeout_secs,
            })
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    match output.status.code() {
        Some(0) => Ok(stdout),
        Some(1) if serde_json::from_str::<Map<String, Value>>(&stdout).is_ok() => Ok(stdout),
        code => Err(ToolError::Command {
            command: command_line,
            message: format!(
                "exited with {}: {}",
                code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }),
    }
}
