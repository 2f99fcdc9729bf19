// MCP (Model Context Protocol) surface for the Xentral adapter.
// JSON-RPC 2.0 envelope handling, the tool contract, and request dispatch.

pub mod dispatcher;
pub mod protocol;
pub mod tools;

pub use dispatcher::Dispatcher;
pub use tools::{builtin_registry, SharedRegistry, Tool, ToolRegistry};
