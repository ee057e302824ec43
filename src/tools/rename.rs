use crate::error::{Result, ToolError};
use crate::guard::AllowedDirectories;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub success: bool,
    pub old_path: String,
    pub new_path: String,
    pub message: String,
}

/// Moves a file or directory; never overwrites an existing destination.
pub fn rename(allowed: &AllowedDirectories, request: &RenameRequest) -> Result<RenameResponse> {
    let old_path = allowed.validate(&request.old_path)?;
    let new_path = allowed.validate(&request.new_path)?;

    if fs::symlink_metadata(&old_path).is_err() {
        return Err(ToolError::NotFound(old_path));
    }
    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(ToolError::InvalidRequest(format!(
            "destination already exists: {}",
            new_path.display()
        )));
    }

    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent).map_err(ToolError::at(parent))?;
    }
    fs::rename(&old_path, &new_path).map_err(ToolError::at(&old_path))?;

    info!("Renamed {} -> {}", old_path.display(), new_path.display());
    Ok(RenameResponse {
        success: true,
        message: format!(
            "Successfully renamed {} to {}",
            old_path.display(),
            new_path.display()
        ),
        old_path: old_path.display().to_string(),
        new_path: new_path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AllowedDirectories) {
        let dir = TempDir::new().unwrap();
        let allowed = AllowedDirectories::canonicalize([dir.path()]).unwrap();
        (dir, allowed)
    }

    fn request(old: &str, new: &str) -> RenameRequest {
        RenameRequest {
            old_path: old.to_string(),
            new_path: new.to_string(),
        }
    }

    #[test]
    fn renames_and_creates_missing_parents() {
        let (_dir, allowed) = setup();
        let root = allowed.primary().to_path_buf();
        fs::write(root.join("a.txt"), "hello").unwrap();

        let response = rename(&allowed, &request("a.txt", "nested/deep/b.txt")).unwrap();
        assert!(response.success);
        assert!(!root.join("a.txt").exists());
        assert_eq!(fs::read_to_string(root.join("nested/deep/b.txt")).unwrap(), "hello");
    }

    #[test]
    fn refuses_existing_destination() {
        let (_dir, allowed) = setup();
        let root = allowed.primary().to_path_buf();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();

        let err = rename(&allowed, &request("a.txt", "b.txt")).unwrap_err();
        assert!(matches!(err, ToolError::InvalidRequest(_)));
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "b");
    }

    #[test]
    fn missing_source_is_not_found() {
        let (_dir, allowed) = setup();
        let err = rename(&allowed, &request("ghost.txt", "b.txt")).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn destination_outside_allow_list_is_denied() {
        let (_dir, allowed) = setup();
        fs::write(allowed.primary().join("a.txt"), "a").unwrap();
        let err = rename(&allowed, &request("a.txt", "../../escaped.txt")).unwrap_err();
        assert!(matches!(err, ToolError::AccessDenied(_)));
        assert!(allowed.primary().join("a.txt").exists());
    }
}
