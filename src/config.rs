use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchDefaults,

    #[serde(default)]
    pub outdated: OutdatedConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Values used when a `search_files` call leaves an option unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub snippet_length: usize,
    pub max_results: usize,
    /// Matches shown per file before the "+N more" line in grouped output.
    pub grouped_match_limit: usize,
    /// Directory names skipped in addition to the built-in list.
    pub extra_excluded_dirs: Vec<String>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            snippet_length: 50,
            max_results: 100,
            grouped_match_limit: 10,
            extra_excluded_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutdatedConfig {
    #[serde(default = "default_outdated_command")]
    pub command: String,
    #[serde(default = "default_outdated_timeout")]
    pub timeout_secs: u64,
}

fn default_outdated_command() -> String {
    "npm".to_string()
}
fn default_outdated_timeout() -> u64 {
    30
}

impl Default for OutdatedConfig {
    fn default() -> Self {
        Self {
            command: default_outdated_command(),
            timeout_secs: default_outdated_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Used only when no directories are passed on the command line.
    pub allowed_directories: Vec<PathBuf>,
}

impl Config {
    /// Loads `explicit` if given, else the first config file found, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };
        if let Some(path) = config_path {
            log::debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("fsmcp/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".fsmcp.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".fsmcp.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }
}
