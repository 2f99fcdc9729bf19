//! HTTP client for the Xentral REST API.
//!
//! Tools talk to Xentral through the [`XentralApi`] trait so they stay
//! independent of the concrete transport and can be tested against fakes.

use crate::config::SharedConfig;
use crate::error::ToolError;
use serde_json::{Map, Value};
use std::time::Duration;

const USER_AGENT: &str = concat!("xentral-mcp/", env!("CARGO_PKG_VERSION"));

/// Query parameters in Xentral's `filter[...]`/`page[...]` convention.
pub type Query = Vec<(String, String)>;

/// Read access to the upstream ERP API.
#[async_trait::async_trait]
pub trait XentralApi: Send + Sync {
    /// GET a JSON endpoint (e.g. `api/v2/customers`) with query parameters.
    async fn get(&self, endpoint: &str, query: &Query) -> Result<Value, ToolError>;
}

/// Real client backed by reqwest. Credentials come from [`SharedConfig`] and
/// are re-read per request, so a runtime credential swap takes effect on the
/// next upstream call without rebuilding the client.
pub struct XentralClient {
    config: SharedConfig,
    http: reqwest::Client,
}

impl XentralClient {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl XentralApi for XentralClient {
    async fn get(&self, endpoint: &str, query: &Query) -> Result<Value, ToolError> {
        let config = self.config.snapshot();
        let url = join_url(config.base_url_trimmed(), endpoint);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(query)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::UpstreamTimeout {
                        timeout_secs: config.timeout_secs,
                    }
                } else {
                    ToolError::Internal(format!("request to Xentral failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ToolError::Internal(format!("failed to read Xentral response: {e}"))
        })?;

        if !status.is_success() {
            return Err(ToolError::UpstreamRejected {
                status: status.as_u16(),
                message: truncate(&body, 500),
            });
        }

        // Some endpoints answer with plain text; wrap it so callers always
        // get a JSON value (mirrors the API's own error envelopes).
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) => Ok(serde_json::json!({ "text": body })),
        }
    }
}

fn join_url(base: &str, endpoint: &str) -> String {
    format!("{}/{}", base, endpoint.trim_start_matches('/'))
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    }
}

// Query building helpers shared by the tools.

/// Map tool arguments onto Xentral filter parameters.
///
/// `mapping` pairs an argument name with the API filter key, producing
/// `filter[<key>][value]=<arg>` for every argument that is present.
pub fn filter_params(args: &Map<String, Value>, mapping: &[(&str, &str)]) -> Query {
    let mut query = Query::new();
    for (arg_name, api_key) in mapping {
        if let Some(value) = args.get(*arg_name).and_then(query_value) {
            query.push((format!("filter[{api_key}][value]"), value));
        }
    }
    query
}

/// Pagination parameters: `page` becomes `page[number]`, `per_page` (or the
/// `limit` alias) becomes `page[size]`.
pub fn pagination_params(args: &Map<String, Value>) -> Query {
    let mut query = Query::new();
    if let Some(page) = args.get("page").and_then(query_value) {
        query.push(("page[number]".to_string(), page));
    }
    if let Some(size) = args
        .get("per_page")
        .or_else(|| args.get("limit"))
        .and_then(query_value)
    {
        query.push(("page[size]".to_string(), size));
    }
    query
}

/// Sorting parameter passthrough.
pub fn sort_params(args: &Map<String, Value>) -> Query {
    match args.get("sort").and_then(query_value) {
        Some(sort) => vec![("sort".to_string(), sort)],
        None => Query::new(),
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
