use super::ErrorResponse;
use crate::config::{AppState, SERVER_NAME};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use xentral_mcp::protocol::PROTOCOL_VERSION;

/// Main MCP JSON-RPC endpoint. Dispatch never fails; protocol-level errors
/// come back as JSON-RPC error objects with HTTP 200, notifications as 204.
pub async fn handle_mcp(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.dispatcher.handle(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Health check: process liveness and registry size.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "initialized": state.dispatcher.is_initialized(),
        "tools_count": state.dispatcher.registry().current().len(),
    }))
}

/// Server information, with the API key masked.
pub async fn server_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.snapshot();

    Json(serde_json::json!({
        "server": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "protocol_version": PROTOCOL_VERSION,
            "tools_count": state.dispatcher.registry().current().len(),
            "initialized": state.dispatcher.is_initialized(),
        },
        "config": {
            "api_url": config.base_url,
            "api_key": config.masked_key(),
            "timeout_secs": config.timeout_secs,
        },
    }))
}

/// Plain tool listing for operators (non-protocol convenience view).
pub async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.dispatcher.registry().current();

    let tools: Vec<serde_json::Value> = registry
        .list()
        .into_iter()
        .map(|descriptor| {
            serde_json::json!({
                "name": descriptor.name,
                "description": descriptor.description,
                "parameters": descriptor.parameters.iter().map(|p| {
                    serde_json::json!({
                        "name": p.name,
                        "type": p.kind.json_type(),
                        "description": p.description,
                        "required": p.required,
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "total": tools.len(),
        "tools": tools,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CredentialsUpdate {
    pub api_url: String,
    pub api_key: String,
}

/// Update API credentials at runtime (atomic swap, serving continues).
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    Json(update): Json<CredentialsUpdate>,
) -> Response {
    match state
        .config
        .update_credentials(&update.api_url, &update.api_key)
    {
        Ok(()) => {
            let config = state.config.snapshot();
            Json(serde_json::json!({
                "status": "success",
                "message": "API credentials updated",
                "api_url": config.base_url,
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Rebuild and atomically swap the tool registry.
pub async fn reload_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state.reload_registry();

    Json(serde_json::json!({
        "status": "success",
        "tools_count": count,
    }))
}
