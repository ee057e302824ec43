use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable error class carried by every RPC error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    InvalidParams,
    InternalError,
}

impl ErrorKind {
    pub fn code(&self) -> i64 {
        match self {
            ErrorKind::InvalidRequest => -32600,
            ErrorKind::InvalidParams => -32602,
            ErrorKind::InternalError => -32603,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid-request",
            ErrorKind::InvalidParams => "invalid-params",
            ErrorKind::InternalError => "internal-error",
        }
    }
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Access denied - path outside allowed directories: {}", .0.display())]
    AccessDenied(PathBuf),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to process '{path}': {source}")]
    FileOperation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed: {message}")]
    Command { command: String, message: String },

    #[error("Command '{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::AccessDenied(_)
            | ToolError::InvalidRequest(_)
            | ToolError::UnknownTool(_)
            | ToolError::NotFound(_) => ErrorKind::InvalidRequest,
            ToolError::InvalidParams(_) | ToolError::Regex(_) => ErrorKind::InvalidParams,
            _ => ErrorKind::InternalError,
        }
    }

    /// JSON-RPC error code; unknown tools report "method not found".
    pub fn code(&self) -> i64 {
        match self {
            ToolError::UnknownTool(_) => -32601,
            other => other.kind().code(),
        }
    }

    /// Finer-grained classification reported alongside the RPC kind.
    pub fn category(&self) -> &'static str {
        match self {
            ToolError::AccessDenied(_) => "access-denied",
            ToolError::InvalidRequest(_) | ToolError::InvalidParams(_) => "invalid-request",
            ToolError::NotFound(_) => "not-found",
            ToolError::UnknownTool(_) => "unknown-tool",
            ToolError::Regex(_) => "invalid-pattern",
            ToolError::Timeout { .. } => "timeout",
            _ => "internal",
        }
    }

    pub(crate) fn at(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> ToolError {
        let path = path.into();
        move |source| ToolError::FileOperation { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_is_invalid_request() {
        let err = ToolError::AccessDenied(PathBuf::from("/etc/passwd"));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.kind().code(), -32600);
        assert_eq!(err.category(), "access-denied");
        assert!(err.to_string().contains("/etc/passwd"));
    }

    #[test]
    fn bad_regex_is_invalid_params() {
        let err: ToolError = regex::Regex::new("(").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
        assert_eq!(err.kind().as_str(), "invalid-params");
    }

    #[test]
    fn unknown_tool_uses_method_not_found_code() {
        let err = ToolError::UnknownTool("format_disk".to_string());
        assert_eq!(err.code(), -32601);
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn io_errors_are_internal() {
        let err: ToolError = io::Error::other("busy").into();
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert_eq!(err.kind().code(), -32603);
    }
}
