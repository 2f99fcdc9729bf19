// JSON-RPC dispatch: envelope validation, method routing, error translation

use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    PROTOCOL_VERSION,
};
use crate::tools::SharedRegistry;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Stateless per-request dispatcher over the shared tool registry.
///
/// Every failure mode is translated into a JSON-RPC error object; nothing
/// escapes to the transport layer as a fault.
pub struct Dispatcher {
    server_name: String,
    server_version: String,
    registry: SharedRegistry,
    initialized: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        server_name: impl Into<String>,
        server_version: impl Into<String>,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            registry,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Whether a client has completed `initialize` (reported by /health).
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Handle one raw JSON-RPC request body.
    ///
    /// Returns `None` for notifications, which get no response.
    pub async fn handle(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(format!("Invalid JSON: {e}")),
                ));
            }
        };

        // Keep whatever id we can extract so even invalid requests echo it.
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Malformed request: {e}")),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("jsonrpc field must be \"2.0\""),
            ));
        }

        if request.method.starts_with("notifications/") {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        }

        tracing::debug!(method = %request.method, "dispatching request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        self.initialized.store(true, Ordering::Relaxed);
        tracing::info!("initialize request received");

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
                server_info: ServerInfo {
                    name: self.server_name.clone(),
                    version: self.server_version.clone(),
                },
            },
        )
    }

    fn handle_list_tools(&self, id: Value) -> JsonRpcResponse {
        let registry = self.registry.current();
        tracing::debug!(tools = registry.len(), "tools/list request");

        JsonRpcResponse::success(
            id,
            ListToolsResult {
                tools: registry.schemas(),
            },
        )
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(params) => params,
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("tools/call requires parameters"),
                );
            }
        };

        let call: CallToolParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")),
                );
            }
        };

        let arguments: Map<String, Value> = match call.arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("arguments must be an object"),
                );
            }
        };

        // Snapshot once: the whole call is served against one registry
        // generation, reloads notwithstanding.
        let registry = self.registry.current();

        let tool = match registry.resolve(&call.name) {
            Some(tool) => tool,
            None => {
                tracing::warn!(tool = %call.name, "tool not found");
                return JsonRpcResponse::error(id, JsonRpcError::tool_not_found(&call.name));
            }
        };

        // Required parameters are checked before the tool runs, so a
        // rejected call never touches the ERP.
        if let Some(descriptor) = registry.descriptor(&call.name) {
            let missing: Vec<&str> = descriptor
                .required_parameters()
                .filter(|p| !arguments.contains_key(p.name))
                .map(|p| p.name)
                .collect();
            if !missing.is_empty() {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!(
                        "Missing required parameter(s): {}",
                        missing.join(", ")
                    )),
                );
            }
        }

        let started = Instant::now();
        match tool.execute(&arguments).await {
            Ok(text) => {
                tracing::info!(
                    tool = %call.name,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "tool call succeeded"
                );
                JsonRpcResponse::success(id, CallToolResult::text(text))
            }
            Err(e) if e.is_invalid_arguments() => {
                tracing::warn!(tool = %call.name, error = %e, "tool rejected arguments");
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(
                    tool = %call.name,
                    kind = e.kind(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "tool call failed"
                );
                JsonRpcResponse::error(
                    id,
                    JsonRpcError::tool_execution_error(format!("Tool execution failed: {e}")),
                )
            }
        }
    }
}
