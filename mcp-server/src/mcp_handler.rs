use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{LotteryUseCase, SyncUseCase};

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id: Some(id.unwrap_or(json!(1))),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

impl Tool {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

fn type_property() -> Value {
    json!({
        "type": "string",
        "enum": ["HK", "MO_NEW", "MO_OLD"],
        "description": "Lottery feed"
    })
}

fn expect_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

pub struct MCPHandler {
    lottery_use_case: Arc<LotteryUseCase>,
    sync_use_case: Arc<SyncUseCase>,
}

impl MCPHandler {
    pub fn new(lottery_use_case: Arc<LotteryUseCase>, sync_use_case: Arc<SyncUseCase>) -> Self {
        Self {
            lottery_use_case,
            sync_use_case,
        }
    }

    /// Answers one JSON-RPC request per input line until the reader is exhausted.
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: PARSE_ERROR,
                            message: "Parse error".to_string(),
                            data: Some(json!(e.to_string())),
                        }),
                        id: None,
                    };
                    writeln!(writer, "{}", serde_json::to_string(&response)?)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications never get a response.
            if request.id.is_none() || request.method.starts_with("notifications/") {
                if request.method == "notifications/initialized" {
                    info!("🎰 Client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            writeln!(writer, "{}", serde_json::to_string(&response)?)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => {
                info!("🎰 Initializing six-ball admin server");
                JsonRpcResponse::success(
                    request.id,
                    json!({
                        "protocolVersion": "2024-11-05",
                        "capabilities": {
                            "tools": {}
                        },
                        "serverInfo": {
                            "name": env!("CARGO_PKG_NAME"),
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    }),
                )
            }
            "tools/list" => JsonRpcResponse::success(request.id, json!({ "tools": self.get_tools() })),
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse::failure(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing params");
        };
        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing tool name");
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> =
            serde_json::from_value(arguments).unwrap_or_default();

        match self.execute_tool(tool_name, &arguments_map).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                }),
            ),
            Err(e) => {
                warn!("Tool {} failed: {:#}", tool_name, e);
                JsonRpcResponse::failure(id, INTERNAL_ERROR, format!("Tool execution error: {}", e))
            }
        }
    }

    async fn execute_tool(&self, tool_name: &str, arguments: &HashMap<String, Value>) -> Result<String> {
        match tool_name {
            "sync_draws" => self.sync_use_case.sync_draws(arguments).await,
            "generate_prediction" => self.lottery_use_case.generate_prediction(arguments).await,
            "list_draws" => self.lottery_use_case.list_draws(arguments).await,
            "delete_draw" => self.lottery_use_case.delete_draw(arguments).await,
            "get_prediction" => self.lottery_use_case.get_prediction(arguments).await,
            "verify_prediction" => self.lottery_use_case.verify_prediction(arguments).await,
            "reset_database" => self.lottery_use_case.reset_database(arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", tool_name)),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        vec![
            Tool::new(
                "sync_draws",
                "Fetch the configured feed, store new draws and refresh the next prediction",
                json!({
                    "type": "object",
                    "properties": { "type": type_property() },
                    "required": ["type"]
                }),
            ),
            Tool::new(
                "generate_prediction",
                "Score the stored history and save a prediction for the next draw",
                json!({
                    "type": "object",
                    "properties": { "type": type_property() },
                    "required": ["type"]
                }),
            ),
            Tool::new(
                "list_draws",
                "List the most recent stored draws, newest first",
                json!({
                    "type": "object",
                    "properties": {
                        "type": type_property(),
                        "limit": {
                            "type": "integer",
                            "description": "Number of draws to return (default: 10)"
                        }
                    },
                    "required": ["type"]
                }),
            ),
            Tool::new(
                "delete_draw",
                "Delete one stored draw",
                json!({
                    "type": "object",
                    "properties": {
                        "type": type_property(),
                        "expect": expect_property("Draw number to delete")
                    },
                    "required": ["type", "expect"]
                }),
            ),
            Tool::new(
                "get_prediction",
                "Get the stored prediction for a draw, or for the upcoming draw when no number is given",
                json!({
                    "type": "object",
                    "properties": {
                        "type": type_property(),
                        "expect": expect_property("Target draw number")
                    },
                    "required": ["type"]
                }),
            ),
            Tool::new(
                "verify_prediction",
                "Compare a stored prediction with the draw it targeted",
                json!({
                    "type": "object",
                    "properties": {
                        "type": type_property(),
                        "expect": expect_property("Draw number to verify")
                    },
                    "required": ["type", "expect"]
                }),
            ),
            Tool::new(
                "reset_database",
                "Drop and recreate the draw and prediction tables",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
