use super::{
    CHECK_OUTDATED, DELETE_FILE, EXPLORE_PROJECT, LIST_ALLOWED_DIRECTORIES, RENAME_FILE,
    SEARCH_FILES,
};
use serde_json::{json, Value};

/// `tools/list` payload: name, description and JSON schema for each tool.
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": SEARCH_FILES,
            "description": "Search file contents under an allowed directory. Supports literal or regex patterns, case/word/multiline options, extension, size, date and name filters, optional comment/string stripping, and text, structured or JSON output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "Text or regex to find. Default: match every line" },
                    "searchPath": { "type": "string", "description": "Directory to search. Default: first allowed directory" },
                    "extensions": { "type": "array", "items": { "type": "string" }, "description": "Only search these extensions (e.g. [\".rs\", \"toml\"])" },
                    "excludeExtensions": { "type": "array", "items": { "type": "string" }, "description": "Never search these extensions; wins over extensions" },
                    "excludePatterns": { "type": "array", "items": { "type": "string" }, "description": "File or directory names to skip. Globs (* ?) or substrings" },
                    "regexMode": { "type": "boolean", "default": false },
                    "caseSensitive": { "type": "boolean", "default": false },
                    "wordBoundary": { "type": "boolean", "default": false },
                    "multiline": { "type": "boolean", "default": false },
                    "maxDepth": { "type": "integer", "minimum": 0, "description": "0 searches only the directory's own files" },
                    "followSymlinks": { "type": "boolean", "default": false },
                    "includeBinary": { "type": "boolean", "default": false },
                    "minSize": { "type": "integer", "minimum": 0, "description": "Minimum file size in bytes" },
                    "maxSize": { "type": "integer", "minimum": 0, "description": "Maximum file size in bytes" },
                    "modifiedAfter": { "type": "string", "description": "RFC 3339 timestamp or YYYY-MM-DD" },
                    "modifiedBefore": { "type": "string", "description": "RFC 3339 timestamp or YYYY-MM-DD" },
                    "snippetLength": { "type": "integer", "minimum": 0, "default": 50, "description": "Characters of context on each side of a match" },
                    "maxResults": { "type": "integer", "minimum": 1, "default": 100 },
                    "sortBy": { "type": "string", "enum": ["relevance", "file", "lineNumber", "modified", "size"], "default": "relevance" },
                    "groupByFile": { "type": "boolean", "default": true },
                    "excludeComments": { "type": "boolean", "default": false },
                    "excludeStrings": { "type": "boolean", "default": false },
                    "outputFormat": { "type": "string", "enum": ["text", "json", "structured"], "default": "text" }
                }
            }
        },
        {
            "name": RENAME_FILE,
            "description": "Rename or move a file or directory. Fails if the destination exists; creates missing parent directories.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "oldPath": { "type": "string" },
                    "newPath": { "type": "string" }
                },
                "required": ["oldPath", "newPath"]
            }
        },
        {
            "name": DELETE_FILE,
            "description": "Delete a file or directory. Non-empty directories require recursive=true; force clears a read-only flag first.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "recursive": { "type": "boolean", "default": false },
                    "force": { "type": "boolean", "default": false }
                },
                "required": ["path"]
            }
        },
        {
            "name": EXPLORE_PROJECT,
            "description": "List a project's files with sizes, flag empty files, and show import/export lines of code files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" },
                    "subDirectory": { "type": "string" },
                    "includeHidden": { "type": "boolean", "default": false }
                },
                "required": ["directory"]
            }
        },
        {
            "name": CHECK_OUTDATED,
            "description": "Report outdated npm dependencies of a project containing package.json.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "projectPath": { "type": "string", "description": "Default: first allowed directory" },
                    "includeDevDependencies": { "type": "boolean", "default": true },
                    "outputFormat": { "type": "string", "enum": ["detailed", "summary"], "default": "detailed" }
                }
            }
        },
        {
            "name": LIST_ALLOWED_DIRECTORIES,
            "description": "List the directories this server is allowed to access.",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_has_a_schema() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                assert_eq!(t["inputSchema"]["type"], "object");
                t["name"].as_str().unwrap()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                SEARCH_FILES,
                RENAME_FILE,
                DELETE_FILE,
                EXPLORE_PROJECT,
                CHECK_OUTDATED,
                LIST_ALLOWED_DIRECTORIES
            ]
        );
    }
}
