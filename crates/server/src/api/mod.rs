use crate::config::AppState;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the API server
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
fn create_router(state: AppState) -> Router {
    Router::new()
        // Main MCP JSON-RPC endpoint
        .route("/mcp", post(handlers::handle_mcp))
        // Operational endpoints
        .route("/health", get(handlers::health_check))
        .route("/info", get(handlers::server_info))
        .route("/tools", get(handlers::list_tools))
        .route("/tools/reload", post(handlers::reload_tools))
        .route("/config/credentials", post(handlers::update_credentials))
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        // Web-based MCP clients call from arbitrary origins
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use xentral_mcp_core::XentralConfig;

    fn test_router() -> Router {
        let state = AppState::new(XentralConfig {
            base_url: "https://erp.example.com".to_string(),
            api_key: "testkey0123456789".to_string(),
            timeout_secs: 5,
        });
        create_router(state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_tool_count() {
        let response = test_router().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["server"], "xentral-mcp-server");
        assert_eq!(body["tools_count"], 2);
        assert_eq!(body["initialized"], false);
    }

    #[tokio::test]
    async fn mcp_endpoint_lists_tools() {
        let request = post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        );
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "search_customers");
    }

    #[tokio::test]
    async fn mcp_endpoint_translates_parse_errors() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{broken"))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn notifications_get_no_content() {
        let request = post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        );
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn credentials_update_shows_up_in_info() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(post_json(
                "/config/credentials",
                json!({"api_url": "https://other.example.com", "api_key": "rotated0123456789"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "success");

        let info = body_json(router.oneshot(get_request("/info")).await.unwrap()).await;
        assert_eq!(info["config"]["api_url"], "https://other.example.com");
        let masked = info["config"]["api_key"].as_str().unwrap();
        assert!(!masked.contains("rotated"));
    }

    #[tokio::test]
    async fn invalid_credentials_are_rejected_with_400() {
        let response = test_router()
            .oneshot(post_json(
                "/config/credentials",
                json!({"api_url": "not a url", "api_key": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn tools_endpoint_lists_descriptors() {
        let response = test_router().oneshot(get_request("/tools")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["tools"][1]["name"], "search_products");
        assert!(body["tools"][0]["parameters"].is_array());
    }

    #[tokio::test]
    async fn reload_rebuilds_the_registry() {
        let response = test_router()
            .oneshot(post_json("/tools/reload", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["tools_count"], 2);
    }
}
