// Customer search against the Xentral customer endpoint

use crate::tools::{ParamKind, Tool, ToolDescriptor, ToolParameter};
use serde_json::{Map, Value};
use std::sync::Arc;
use xentral_mcp_core::client::{filter_params, pagination_params};
use xentral_mcp_core::{format, ToolError, XentralApi};

const ENDPOINT: &str = "api/v2/customers";
const MAX_LISTED: usize = 10;

/// Argument name -> Xentral filter key.
const FILTERS: &[(&str, &str)] = &[
    ("customer_id", "id"),
    ("customer_number", "number"),
    ("name", "name"),
    ("email", "email"),
    ("phone", "phone"),
    ("city", "city"),
];

/// Search and find customers by various criteria.
pub struct SearchCustomersTool {
    api: Arc<dyn XentralApi>,
}

impl SearchCustomersTool {
    pub fn new(api: Arc<dyn XentralApi>) -> Self {
        Self { api }
    }

    fn format_summary(&self, response: &Value) -> String {
        let items = match response.get("data").and_then(Value::as_array) {
            Some(items) if !items.is_empty() => items,
            _ => return "No customers found.".to_string(),
        };

        let total = response
            .pointer("/meta/total")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);

        let mut out = vec![format!("Found {total} customer(s):\n")];

        for (i, item) in items.iter().take(MAX_LISTED).enumerate() {
            out.push(format!("{}. {}", i + 1, field(item, "name")));
            out.push(format!("   Number: {}", field(item, "number")));
            out.push(format!("   ID: {}", field(item, "id")));
            out.push(format!("   Email: {}", field(item, "email")));
            out.push(format!("   Phone: {}", field(item, "phone")));
            out.push(String::new());
        }

        if items.len() > MAX_LISTED {
            out.push(format!("... and {} more", items.len() - MAX_LISTED));
        }

        out.join("\n")
    }
}

fn field(item: &Value, key: &str) -> String {
    match item.get(key) {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[async_trait::async_trait]
impl Tool for SearchCustomersTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_customers",
            description: "Search and find customers by various criteria".to_string(),
            parameters: vec![
                ToolParameter::optional("customer_id", ParamKind::Integer, "Customer ID"),
                ToolParameter::optional("customer_number", ParamKind::String, "Customer Number"),
                ToolParameter::optional("name", ParamKind::String, "Customer Name"),
                ToolParameter::optional("email", ParamKind::String, "Email Address"),
                ToolParameter::optional("phone", ParamKind::String, "Phone Number"),
                ToolParameter::optional("city", ParamKind::String, "City"),
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

        Ok(self.format_summary(&response))
    }
}
