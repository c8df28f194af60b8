// MCP surface: JSON-RPC framing, tool/prompt catalogues, dispatch and transports.

pub mod http;
pub mod prompts;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;

pub use server::{Exchange, McpServer};
