// Product search against the Xentral product endpoint

use crate::tools::{ParamKind, Tool, ToolDescriptor, ToolParameter};
use serde_json::{Map, Value};
use std::sync::Arc;
use xentral_mcp_core::client::{filter_params, pagination_params};
use xentral_mcp_core::{format, ToolError, XentralApi};

const ENDPOINT: &str = "api/v2/products";
const COLUMNS: &[&str] = &["id", "article_number", "name", "type", "device_type", "weight"];

const FILTERS: &[(&str, &str)] = &[
    ("product_id", "id"),
    ("article_number", "article_number"),
    ("name", "name"),
    ("type", "type"),
    ("device_type", "device_type"),
];

/// Search and find products, rendered as a table.
pub struct SearchProductsTool {
    api: Arc<dyn XentralApi>,
}

impl SearchProductsTool {
    pub fn new(api: Arc<dyn XentralApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for SearchProductsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_products",
            description: "Search and find products by various criteria".to_string(),
            parameters: vec![
                ToolParameter::optional("product_id", ParamKind::Integer, "Product ID"),
                ToolParameter::optional("article_number", ParamKind::String, "Article Number"),
                ToolParameter::optional("name", ParamKind::String, "Product Name"),
                ToolParameter::optional("type", ParamKind::String, "Product Type"),
                ToolParameter::optional("device_type", ParamKind::String, "Device Type"),
                ToolParameter::optional("page", ParamKind::Integer, "Page Number"),
                ToolParameter::optional("limit", ParamKind::Integer, "Results Limit"),
                ToolParameter::optional("raw", ParamKind::Boolean, "Show raw API response"),
            ],
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let mut query = filter_params(arguments, FILTERS);
        query.extend(pagination_params(arguments));

        let response = self.api.get(ENDPOINT, &query).await?;

        if arguments.get("raw").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(format::json_block(&response));
        }

        let items = response
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total = response
            .pointer("/meta/total")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64) as usize;

        Ok(format::table(
            &items,
            COLUMNS,
            "Product Search Results",
            total,
        ))
    }
}
