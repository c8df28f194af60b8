use crate::core::context::{LogLevel, LogMessage, ToolContext};
use crate::core::service::NewsAnalyzer;
use crate::mcp::protocol::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR,
    INVALID_REQUEST, JSONRPC_VERSION, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::mcp::{prompts, tools};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

pub const SERVER_NAME: &str = "News Context Analyzer";
pub const LOGGER_NAME: &str = "news-context-analyzer";

#[derive(Debug, Deserialize)]
struct SetLevelParams {
    level: LogLevel,
}

#[derive(Debug, Deserialize)]
struct NamedParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// Everything a transport has to write back for one incoming message:
/// log notifications first, then the response (absent for notifications).
#[derive(Debug, Default)]
pub struct Exchange {
    pub notifications: Vec<JsonRpcNotification>,
    pub response: Option<JsonRpcResponse>,
}

impl Exchange {
    fn reply(response: JsonRpcResponse) -> Self {
        Self {
            notifications: Vec::new(),
            response: Some(response),
        }
    }

    /// Reply to bytes that are not a JSON-RPC message at all.
    pub fn parse_error(detail: impl Display) -> Self {
        tracing::warn!("Discarding unparsable message: {}", detail);
        Self::reply(JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", detail)),
        ))
    }

    /// Serialized frames in write order.
    pub fn into_frames(self) -> Vec<String> {
        let notifications = self.notifications.iter().map(serde_json::to_string);
        let response = self.response.iter().map(serde_json::to_string);

        notifications
            .chain(response)
            .filter_map(|frame| match frame {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::error!("Failed to serialize outgoing frame: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Transport-independent MCP request dispatcher.
#[derive(Clone)]
pub struct McpServer {
    analyzer: Arc<dyn NewsAnalyzer>,
    // minimum level forwarded as `notifications/message`, set by `logging/setLevel`
    log_level: Arc<RwLock<LogLevel>>,
}

impl McpServer {
    pub fn new(analyzer: Arc<dyn NewsAnalyzer>) -> Self {
        Self {
            analyzer,
            log_level: Arc::new(RwLock::new(LogLevel::default())),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.read().map(|level| *level).unwrap_or_default()
    }

    /// Handle one raw JSON-RPC message as received from the wire.
    pub async fn handle_message(&self, raw: &str) -> Exchange {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return Exchange::parse_error(e),
        };

        // A client answering a server-initiated request; nothing to do.
        if value.get("method").is_none()
            && (value.get("result").is_some() || value.get("error").is_some())
        {
            return Exchange::default();
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Exchange::reply(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ));
            }
        };

        let ctx = ToolContext::new();
        let notification = request.is_notification();
        let method = request.method.clone();
        let response = match AssertUnwindSafe(self.handle(request, &ctx)).catch_unwind().await {
            Ok(response) => response,
            Err(_) => {
                tracing::error!("Handler for {} panicked", method);
                (!notification).then(|| {
                    JsonRpcResponse::failure(id, JsonRpcError::new(INTERNAL_ERROR, "Internal error"))
                })
            }
        };

        let threshold = self.log_level();
        Exchange {
            notifications: ctx
                .drain()
                .into_iter()
                .filter(|message| message.level >= threshold)
                .map(log_notification)
                .collect(),
            response,
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest, ctx: &ToolContext) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(
                    INVALID_REQUEST,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                ),
            ));
        }

        tracing::debug!("Handling {} (id {})", request.method, id);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "logging/setLevel" => self.set_log_level(request.params),
            "tools/list" => Ok(json!({ "tools": tools::catalogue() })),
            "tools/call" => self.call_tool(request.params, ctx).await,
            "prompts/list" => Ok(json!({ "prompts": prompts::catalogue() })),
            "prompts/get" => self.get_prompt(request.params),
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::warn!("{} failed: {}", request.method, error.message);
                JsonRpcResponse::failure(id, error)
            }
        })
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::info!("MCP session initialized"),
            "notifications/cancelled" => tracing::debug!("Client cancelled a request"),
            other => tracing::debug!("Ignoring notification {}", other),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        let client = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        tracing::info!("Client '{}' connected (protocol {})", client, requested);

        json!({
            "protocolVersion": requested,
            "capabilities": {
                "tools": { "listChanged": false },
                "prompts": { "listChanged": false },
                "logging": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: Option<Value>, ctx: &ToolContext) -> Result<Value, JsonRpcError> {
        let params: NamedParams = parse_params(params)?;
        let args = &params.arguments;
        let required = |name: &str| tools::string_arg(args, name).map_err(JsonRpcError::invalid_params);

        tracing::info!("Tool call: {}", params.name);

        let text = match params.name.as_str() {
            tools::SIMPLE_TEST => self.analyzer.simple_test(required("text")?),
            tools::SEARCH_NEWS => self.analyzer.search_news(required("keyword")?, ctx).await,
            tools::SEARCH_NEWS_WITH_CONTENT => {
                self.analyzer
                    .search_news_with_content(required("keyword")?, ctx)
                    .await
            }
            tools::COMPARE_NEWS_PERSPECTIVES => {
                self.analyzer
                    .compare_news_perspectives(required("keyword")?, ctx)
                    .await
            }
            other => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", other)));
            }
        };

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false
        }))
    }

    fn set_log_level(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: SetLevelParams = parse_params(params)?;
        match self.log_level.write() {
            Ok(mut level) => *level = params.level,
            Err(_) => return Err(JsonRpcError::new(INTERNAL_ERROR, "Log level lock poisoned")),
        }
        tracing::info!("Client log level set to {:?}", params.level);
        Ok(json!({}))
    }

    fn get_prompt(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: NamedParams = parse_params(params)?;
        prompts::render(&params.name, &params.arguments).map_err(JsonRpcError::invalid_params)
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn log_notification(message: LogMessage) -> JsonRpcNotification {
    JsonRpcNotification::new(
        "notifications/message",
        json!({
            "level": message.level,
            "logger": LOGGER_NAME,
            "data": message.data
        }),
    )
}
