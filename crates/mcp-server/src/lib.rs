//! Spritz API operations served as MCP tools over stdio.

pub mod config;
pub mod handler;

use anyhow::Context as _;
use config::Cli;
use handler::SpritzServer;
use rmcp::ServiceExt as _;
use spritz_http_tools::{ApiClient, ApiClientConfig};
use spritz_openapi_tools::{SpecDocument, ToolCatalog, ToolRouter};
use std::sync::Arc;

/// Load the spec, resolve the tool list and wire the upstream client.
///
/// # Errors
///
/// Any failure here is fatal: unreadable or mismatched spec, unknown operation, duplicate tool
/// name, or invalid client settings.
pub async fn build_server(cli: &Cli) -> anyhow::Result<SpritzServer> {
    let http = reqwest::Client::new();
    let doc = SpecDocument::load(&cli.spec_source(), &http)
        .await
        .context("load OpenAPI spec")?;

    let configs = cli.tool_configs()?;
    let catalog = ToolCatalog::resolve(&doc, configs).context("resolve tools")?;
    tracing::info!(tools = catalog.len(), "resolved tools from OpenAPI spec");

    let client = ApiClient::new(ApiClientConfig {
        base_url: cli.base_url.clone(),
        api_key: cli.api_key.clone(),
        timeout: cli.request_timeout(),
    })
    .context("configure API client")?;

    Ok(SpritzServer::new(ToolRouter::new(
        Arc::new(catalog),
        Arc::new(client),
    )))
}

/// Serve over stdio until the client disconnects or the process is interrupted.
///
/// # Errors
///
/// Returns an error if startup fails or the transport terminates abnormally.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = build_server(&cli).await?;

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP stdio transport")?;
    tracing::info!("Spritz MCP server is running via stdio");

    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            cancel.cancel();
        }
    });

    let reason = service.waiting().await.context("MCP service task")?;
    tracing::info!(?reason, "Spritz MCP server stopped");
    Ok(())
}
