use crate::error::{Result, ToolError};
use crate::guard::AllowedDirectories;
use crate::search::null_as_default;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recursive: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_path: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

pub fn delete(allowed: &AllowedDirectories, request: &DeleteRequest) -> Result<DeleteResponse> {
    let path = allowed.validate(&request.path)?;
    let metadata = match fs::symlink_metadata(&path) {
        Ok(metadata) => metadata,
        Err(_) => return Err(ToolError::NotFound(path)),
    };

    let kind = if metadata.is_dir() {
        delete_directory(&path, request.recursive)?;
        "directory"
    } else {
        if request.force && metadata.permissions().readonly() {
            clear_readonly(&path);
        }
        fs::remove_file(&path).map_err(ToolError::at(&path))?;
        if metadata.file_type().is_symlink() {
            "symlink"
        } else {
            "file"
        }
    };

    info!("Deleted {kind} {}", path.display());
    Ok(DeleteResponse {
        success: true,
        deleted_path: path.display().to_string(),
        kind,
        message: format!("Successfully deleted {kind}: {}", path.display()),
    })
}

fn delete_directory(path: &Path, recursive: bool) -> Result<()> {
    let mut entries = fs::read_dir(path).map_err(ToolError::at(path))?;
    if entries.next().is_some() && !recursive {
        return Err(ToolError::InvalidRequest(format!(
            "directory is not empty: {} (set recursive to delete its contents)",
            path.display()
        )));
    }
    if recursive {
        fs::remove_dir_all(path).map_err(ToolError::at(path))
    } else {
        fs::remove_dir(path).map_err(ToolError::at(path))
    }
}

/// Best effort; a failure here surfaces as the removal error instead.
fn clear_readonly(path: &Path) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };
    let mut permissions = metadata.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    if let Err(err) = fs::set_permissions(path, permissions) {
        debug!("Could not clear read-only flag on {}: {err}", path.display());
    }
}
