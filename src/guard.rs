//! Allow-list enforcement for every path a tool touches.
//!
//! `validate` is lexical: nothing is read from disk, so a path can be
//! rejected before any I/O is attempted on it. `confine` is the second check
//! for existing paths, after symlinks are resolved.
use crate::error::{Result, ToolError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Immutable set of root directories the tools may operate under.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct AllowedDirectories {
    roots: Arc<[PathBuf]>,
}

impl AllowedDirectories {
    /// Builds the allow-list from already-absolute paths, normalising them lexically.
    pub fn new<I, P>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots: Vec<PathBuf> = roots
            .into_iter()
            .map(|p| normalize(&expand_home(p.as_ref())))
            .collect();
        if roots.is_empty() {
            return Err(ToolError::Config(
                "at least one allowed directory is required".to_string(),
            ));
        }
        if let Some(relative) = roots.iter().find(|p| !p.is_absolute()) {
            return Err(ToolError::Config(format!(
                "allowed directory must be absolute: {}",
                relative.display()
            )));
        }
        Ok(Self {
            roots: roots.into(),
        })
    }

    /// Resolves symlinks in each root and checks it is a directory. Startup only.
    pub fn canonicalize<I, P>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut resolved = Vec::new();
        for root in roots {
            let expanded = expand_home(root.as_ref());
            let canonical = expanded
                .canonicalize()
                .map_err(ToolError::at(expanded.clone()))?;
            if !canonical.is_dir() {
                return Err(ToolError::Config(format!(
                    "allowed path is not a directory: {}",
                    canonical.display()
                )));
            }
            resolved.push(canonical);
        }
        Self::new(resolved)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn primary(&self) -> &Path {
        // `new` guarantees at least one root
        &self.roots[0]
    }

    /// Turns caller input into an absolute, normalised path.
    ///
    /// Relative input is anchored at the first allowed directory.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ToolError::InvalidRequest("path must not be empty".to_string()));
        }
        let expanded = expand_home(Path::new(raw));
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.primary().join(expanded)
        };
        Ok(normalize(&absolute))
    }

    /// Resolves `raw` and rejects it unless it lies inside an allowed root.
    pub fn validate(&self, raw: &str) -> Result<PathBuf> {
        let path = self.resolve(raw)?;
        if is_allowed(&path, &self.roots) {
            Ok(path)
        } else {
            log::warn!("Rejected path outside allowed directories: {}", path.display());
            Err(ToolError::AccessDenied(path))
        }
    }

    /// Resolves symlinks in an existing path and checks where it really lives.
    pub fn confine(&self, path: &Path) -> Result<PathBuf> {
        let real = path.canonicalize().map_err(ToolError::at(path))?;
        if is_allowed(&real, &self.roots) {
            Ok(real)
        } else {
            log::warn!(
                "Rejected {} resolving outside allowed directories to {}",
                path.display(),
                real.display()
            );
            Err(ToolError::AccessDenied(path.to_path_buf()))
        }
    }

    /// Returns the allowed root that contains `path`, if any.
    pub fn root_of(&self, path: &Path) -> Option<&Path> {
        let path = normalize(path);
        self.roots
            .iter()
            .find(|root| path.starts_with(root))
            .map(PathBuf::as_path)
    }
}

/// True iff `path` equals one of `roots` or is a descendant of one.
pub fn is_allowed(path: &Path, roots: &[PathBuf]) -> bool {
    let path = normalize(path);
    if !path.is_absolute() {
        return false;
    }
    // component-wise: "/data" does not admit "/database"
    roots.iter().any(|root| path.starts_with(normalize(root)))
}

/// True if `path` itself is a symbolic link; the target is not inspected.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Lexically collapses `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.is_absolute() {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
