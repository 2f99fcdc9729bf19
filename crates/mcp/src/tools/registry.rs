// Tool registry: name -> (implementation, descriptor)

use crate::protocol::ToolSchema;
use crate::tools::{Tool, ToolDescriptor};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct Registered {
    tool: Arc<dyn Tool>,
    descriptor: ToolDescriptor,
}

/// Registry of available tools.
///
/// Listing follows registration order, so `tools/list` output is stable for
/// a given registry instance. The registry is immutable once built; runtime
/// replacement goes through [`SharedRegistry`].
pub struct ToolRegistry {
    order: Vec<String>,
    entries: HashMap<String, Registered>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Register a tool, capturing its descriptor.
    ///
    /// Duplicate names are rejected: the first registration wins and the
    /// later one is dropped with a warning. Returns whether the tool was
    /// accepted.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        let descriptor = tool.descriptor();
        let name = descriptor.name.to_string();

        if self.entries.contains_key(&name) {
            tracing::warn!(tool = %name, "duplicate tool name, keeping the first registration");
            return false;
        }

        self.order.push(name.clone());
        self.entries.insert(name, Registered { tool, descriptor });
        true
    }

    /// Look up a tool implementation by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entries.get(name).map(|r| r.tool.clone())
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entries.get(name).map(|r| &r.descriptor)
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|r| &r.descriptor)
            .collect()
    }

    /// MCP tool schemas in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.list().into_iter().map(|d| d.to_schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the active registry.
///
/// Readers snapshot an `Arc<ToolRegistry>` and service the whole request
/// against it; `swap` atomically replaces the active registry so a reload is
/// never observed half-applied.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<ToolRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    pub fn current(&self) -> Arc<ToolRegistry> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn swap(&self, registry: ToolRegistry) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(registry);
        tracing::info!(tools = guard.len(), "tool registry reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::FakeApi;
    use crate::tools::{ParamKind, ToolParameter};
    use serde_json::{json, Map, Value};
    use xentral_mcp_core::ToolError;

    struct NamedTool(&'static str);

    #[async_trait::async_trait]
    impl Tool for NamedTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: self.0,
                description: format!("tool {}", self.0),
                parameters: vec![ToolParameter::optional(
                    "id",
                    ParamKind::Integer,
                    "Record ID",
                )],
            }
        }

        async fn execute(&self, _arguments: &Map<String, Value>) -> Result<String, ToolError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn listing_follows_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("zeta")));
        registry.register(Arc::new(NamedTool("alpha")));
        registry.register(Arc::new(NamedTool("mid")));

        let names: Vec<&str> = registry.list().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_names_keep_the_first_registration() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(NamedTool("dup"))));
        assert!(!registry.register(Arc::new(NamedTool("dup"))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_unknown_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn swap_replaces_the_registry_without_disturbing_snapshots() {
        let shared = SharedRegistry::new({
            let mut r = ToolRegistry::new();
            r.register(Arc::new(NamedTool("old")));
            r
        });

        let snapshot = shared.current();

        let mut replacement = ToolRegistry::new();
        replacement.register(Arc::new(NamedTool("new")));
        shared.swap(replacement);

        // In-flight snapshot still serves the old mapping.
        assert!(snapshot.resolve("old").is_some());
        assert!(snapshot.resolve("new").is_none());

        // New lookups see exactly the replacement.
        let current = shared.current();
        assert!(current.resolve("old").is_none());
        assert!(current.resolve("new").is_some());
    }

    #[test]
    fn schemas_match_descriptors() {
        let api = FakeApi::returning(json!({}));
        let registry = crate::tools::builtin_registry(api);
        let schemas = registry.schemas();
        assert_eq!(schemas.len(), registry.len());
        assert_eq!(schemas[0].name, "search_customers");
        assert_eq!(schemas[0].input_schema["type"], "object");
    }
}
