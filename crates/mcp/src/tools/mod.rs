// Tool contract and implementations

pub mod customers;
pub mod products;
mod registry;

pub use customers::SearchCustomersTool;
pub use products::SearchProductsTool;
pub use registry::{SharedRegistry, ToolRegistry};

use crate::protocol::ToolSchema;
use serde_json::{Map, Value};
use std::sync::Arc;
use xentral_mcp_core::{ToolError, XentralApi};

/// The extension point: one named operation against the ERP.
///
/// Implementations receive the (already schema-checked for required keys)
/// argument object and return human-readable text, or fail with a
/// [`ToolError`]. They reach Xentral only through the shared [`XentralApi`]
/// handle they were constructed with.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String, ToolError>;
}

/// JSON-schema primitive accepted for a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolParameter {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParameter {
    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }

    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }
}

/// Metadata advertised for a tool. Captured once when the tool is
/// registered and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Derive the MCP `inputSchema` object from the parameter table.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(
                param.name.to_string(),
                serde_json::json!({
                    "type": param.kind.json_type(),
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(param.name);
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn to_schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.to_string(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }
}

/// The registration table: every shipped tool, bound explicitly by name.
///
/// Duplicate names are rejected by the registry (first registration wins),
/// so the order below is also the `tools/list` order.
pub fn builtin_registry(api: Arc<dyn XentralApi>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchCustomersTool::new(api.clone())));
    registry.register(Arc::new(SearchProductsTool::new(api)));
    registry
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::sync::Mutex;
    use xentral_mcp_core::client::Query;

    /// Fake upstream: serves a canned response and records the requests.
    pub struct FakeApi {
        pub response: Value,
        pub calls: Mutex<Vec<(String, Query)>>,
    }

    impl FakeApi {
        pub fn returning(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl XentralApi for FakeApi {
        async fn get(&self, endpoint: &str, query: &Query) -> Result<Value, ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), query.clone()));
            Ok(self.response.clone())
        }
    }

    /// Fake upstream that always fails with the given error constructor.
    pub struct FailingApi<F: Fn() -> ToolError + Send + Sync>(pub F);

    #[async_trait::async_trait]
    impl<F: Fn() -> ToolError + Send + Sync> XentralApi for FailingApi<F> {
        async fn get(&self, _endpoint: &str, _query: &Query) -> Result<Value, ToolError> {
            Err((self.0)())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_schema_lists_properties_and_required() {
        let descriptor = ToolDescriptor {
            name: "demo",
            description: "demo tool".to_string(),
            parameters: vec![
                ToolParameter::required("name", ParamKind::String, "a name"),
                ToolParameter::optional("limit", ParamKind::Integer, "a limit"),
            ],
        };

        let schema = descriptor.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["name"]));
    }

    #[test]
    fn builtin_registry_contains_the_shipped_tools_in_order() {
        let api = testutil::FakeApi::returning(serde_json::json!({}));
        let registry = builtin_registry(api);
        let names: Vec<&str> = registry.list().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["search_customers", "search_products"]);
    }
}
