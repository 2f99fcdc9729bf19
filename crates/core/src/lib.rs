// Core types and functionality for the Xentral MCP adapter

pub mod client;
pub mod config;
pub mod error;
pub mod format;

pub use client::{XentralApi, XentralClient};
pub use config::{SharedConfig, XentralConfig};
pub use error::ToolError;
