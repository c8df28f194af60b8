pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod mcp;
pub mod release;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::Settings;
pub use core::{NewsAnalyzer, NewsService};
pub use mcp::McpServer;
pub use release::ImageRef;
pub use utils::error::{NewsError, Result};
