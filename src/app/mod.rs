//! Composition root: turns resolved [`Settings`] into a running server.

use crate::adapters::{HttpFetcher, NaverClient, RetryPolicy};
use crate::config::{Settings, Transport};
use crate::core::NewsService;
use crate::mcp::{http, stdio, tools, McpServer};
use crate::utils::error::Result;
use std::sync::Arc;

/// Wire the Naver client and article fetcher into an MCP server.
pub fn build_server(settings: &Settings) -> Result<McpServer> {
    let policy = RetryPolicy::from(&settings.http);
    let source = NaverClient::new(settings.naver.clone(), policy)?;
    tracing::debug!("News search endpoint: {}", source.endpoint());
    let fetcher = HttpFetcher::new(policy)?;
    let service = NewsService::new(source, fetcher, settings.search.clone());

    Ok(McpServer::new(Arc::new(service)))
}

/// Run the configured transport until the client disconnects or a shutdown
/// signal arrives.
pub async fn run(settings: &Settings) -> Result<()> {
    if !settings.has_credentials() {
        tracing::warn!(
            "Naver API credentials are not set; searches will fail until NAVER_CLIENT_ID and NAVER_CLIENT_SECRET are provided"
        );
    }

    let server = build_server(settings)?;
    let names: Vec<String> = tools::catalogue().into_iter().map(|t| t.name).collect();
    tracing::info!("Available tools: {}", names.join(", "));

    match settings.server.transport {
        Transport::Stdio => stdio::serve_stdio(server).await,
        Transport::Http => http::serve_http(server, &settings.bind_address()).await,
    }
}
