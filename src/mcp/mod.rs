pub mod tools;
pub mod types;

use anyhow::Result;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::store::RemoteStore;
use types::{
    INVALID_PARAMS, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION,
    SERVER_NAME,
};

/// Newline-delimited JSON-RPC server on stdio exposing the application
/// operations as tools.
pub struct McpServer<S> {
    state: AppState<S>,
}

impl<S: RemoteStore> McpServer<S> {
    pub fn new(state: AppState<S>) -> Self {
        Self { state }
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("MCP server starting on stdio");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        while let Some(line) = lines.next_line().await? {
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.process_message(&line) {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        info!("MCP server shutting down (stdin closed)");
        Ok(())
    }

    fn process_message(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                warn!("parse error: {e}");
                return Some(JsonRpcResponse::parse_error(format!("Parse error: {e}")));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            let id = request.id.unwrap_or(Value::Null);
            return Some(JsonRpcResponse::invalid_request(
                id,
                format!("Invalid jsonrpc version: {}", request.jsonrpc),
            ));
        }

        match request.id {
            None => {
                debug!(method = %request.method, "notification received");
                None
            }
            Some(Value::Null) => Some(JsonRpcResponse::invalid_request(
                Value::Null,
                "Request id must not be null",
            )),
            Some(ref id) if id.is_string() || id.is_number() => {
                Some(self.handle_request(&request, id.clone()))
            }
            Some(id) => Some(JsonRpcResponse::invalid_request(
                id,
                "Request id must be a string or number",
            )),
        }
    }

    fn handle_request(&mut self, request: &JsonRpcRequest, id: Value) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": { "listChanged": false }
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": tools::tool_definitions() }))
            }
            "tools/call" => self.handle_tools_call(request, id),
            _ => JsonRpcResponse::method_not_found(id, &request.method),
        }
    }

    fn handle_tools_call(&mut self, request: &JsonRpcRequest, id: Value) -> JsonRpcResponse {
        let Some(params) = &request.params else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params");
        };

        let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
        };

        let args = params.get("arguments").cloned().unwrap_or(json!({}));

        match tools::dispatch_tool(name, &args, &mut self.state) {
            Some(result) => JsonRpcResponse::success(id, result),
            None => JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::db::{Database, open_temp_db};
    use tempfile::TempDir;

    fn test_server() -> (McpServer<Database>, TempDir, TempDir) {
        let (db, db_dir) = open_temp_db();
        let cache_dir = TempDir::new().unwrap();
        let mut state = AppState::new(db, LocalCache::new(cache_dir.path()));
        state.load();
        (McpServer::new(state), db_dir, cache_dir)
    }

    fn call(server: &mut McpServer<Database>, name: &str, args: Value) -> Value {
        let line = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": args }
        })
        .to_string();
        server.process_message(&line).unwrap().result.unwrap()
    }

    #[test]
    fn test_unknown_method_returns_method_not_found() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"test","id":1}"#;
        let resp = server.process_message(line).unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, types::METHOD_NOT_FOUND);
        assert!(err.message.contains("test"));
    }

    #[test]
    fn test_malformed_json_returns_parse_error() {
        let (mut server, _db, _cache) = test_server();
        let resp = server.process_message("not json").unwrap();
        assert_eq!(resp.error.unwrap().code, types::PARSE_ERROR);
        assert!(resp.id.is_null());
    }

    #[test]
    fn test_invalid_jsonrpc_version() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"1.0","method":"ping","id":1}"#;
        let resp = server.process_message(line).unwrap();
        assert_eq!(resp.error.unwrap().code, types::INVALID_REQUEST);
    }

    #[test]
    fn test_notification_returns_none() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.process_message(line).is_none());
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let (mut server, _db, _cache) = test_server();
        let resp = server
            .process_message(r#"{"jsonrpc":"2.0","method":"ping","id":null}"#)
            .unwrap();
        assert!(resp.error.unwrap().message.contains("null"));

        let resp = server
            .process_message(r#"{"jsonrpc":"2.0","method":"ping","id":true}"#)
            .unwrap();
        assert!(resp.error.unwrap().message.contains("string or number"));
    }

    #[test]
    fn test_initialize_returns_server_info() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"initialize","id":1,"params":{"protocolVersion":"2025-11-25","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;
        let result = server.process_message(line).unwrap().result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(result["serverInfo"]["name"], "grasos");
        assert_eq!(result["serverInfo"]["version"], "0.1.0");
    }

    #[test]
    fn test_ping_returns_empty_object() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"ping","id":1}"#;
        let resp = server.process_message(line).unwrap();
        assert_eq!(resp.result.unwrap(), json!({}));
    }

    #[test]
    fn test_tools_list_matches_definitions() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#;
        let result = server.process_message(line).unwrap().result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), tools::tool_definitions().len());
    }

    #[test]
    fn test_tools_call_unknown_tool() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"tools/call","id":1,"params":{"name":"nonexistent"}}"#;
        let err = server.process_message(line).unwrap().error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("nonexistent"));
    }

    #[test]
    fn test_tools_call_missing_params() {
        let (mut server, _db, _cache) = test_server();
        let line = r#"{"jsonrpc":"2.0","method":"tools/call","id":1}"#;
        let err = server.process_message(line).unwrap().error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
    }

    #[test]
    fn test_state_persists_between_calls() {
        let (mut server, _db, _cache) = test_server();
        let result = call(&mut server, "select_user", json!({"name": "Hanna"}));
        assert!(result.get("isError").is_none());

        let result = call(&mut server, "create_project", json!({"title": "Bastu"}));
        assert!(result.get("isError").is_none());

        let result = call(&mut server, "get_overview", json!({}));
        let text = result["content"][0]["text"].as_str().unwrap();
        let overview: Value = serde_json::from_str(text).unwrap();
        assert_eq!(overview["user"], "Hanna");
        assert_eq!(overview["project_count"], 1);
    }
}
