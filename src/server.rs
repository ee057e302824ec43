//! Newline-delimited JSON-RPC 2.0 over stdio.
use crate::error::ToolError;
use crate::tools::{call_tool, schema::tool_definitions, ToolContext};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;

fn ok(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error(id: Value, code: i64, message: impl Into<String>, data: Option<Value>) -> Value {
    let mut err = json!({ "code": code, "message": message.into() });
    if let Some(data) = data {
        err["data"] = data;
    }
    json!({ "jsonrpc": "2.0", "id": id, "error": err })
}

fn tool_error(id: Value, err: &ToolError) -> Value {
    error(
        id,
        err.code(),
        err.to_string(),
        Some(json!({ "kind": err.kind().as_str(), "category": err.category() })),
    )
}

/// Handles one raw line; `None` for blank lines and notifications.
pub async fn handle_line(ctx: &ToolContext, line: &str) -> Option<Value> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(line) {
        Ok(msg) => handle_message(ctx, &msg).await,
        Err(err) => {
            warn!("Unparseable request: {err}");
            Some(error(Value::Null, PARSE_ERROR, "Parse error", None))
        }
    }
}

pub async fn handle_message(ctx: &ToolContext, msg: &Value) -> Option<Value> {
    let id = msg.get("id").cloned();
    let Some(method) = msg.get("method").and_then(Value::as_str) else {
        return id.map(|id| error(id, INVALID_REQUEST, "Invalid request: missing method", None));
    };
    // notifications carry no id and never get a response
    let id = match id {
        Some(id) => id,
        None => {
            debug!("Notification: {method}");
            return None;
        }
    };

    let response = match method {
        "initialize" => ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
            }),
        ),
        "ping" => ok(id, json!({})),
        "tools/list" => ok(id, json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let params = msg.get("params").cloned().unwrap_or(Value::Null);
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return Some(tool_error(
                    id,
                    &ToolError::InvalidRequest("tools/call requires a tool name".to_string()),
                ));
            };
            let args = params.get("arguments").cloned().unwrap_or(Value::Null);
            match call_tool(ctx, name, args).await {
                Ok(text) => ok(id, json!({ "content": [{ "type": "text", "text": text }] })),
                Err(err) => tool_error(id, &err),
            }
        }
        other => error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"), None),
    };
    Some(response)
}

/// Serves requests from `reader` until EOF, one response line per request.
pub async fn serve<R, W>(ctx: &ToolContext, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handle_line(ctx, &line).await {
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

pub async fn run_stdio(ctx: ToolContext) -> io::Result<()> {
    info!(
        "{SERVER_NAME} {SERVER_VERSION} ready; allowed directories: {:?}",
        ctx.allowed.roots()
    );
    serve(&ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("stdin closed, shutting down");
    debug!("Final metrics:\n{}", ctx.metrics.gather());
    Ok(())
}
