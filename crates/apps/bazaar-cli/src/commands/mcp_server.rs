//! MCP server command implementation.
//!
//! Starts an MCP server on stdio for AI assistant integration.

use bazaar_mcp::run_server;
use tracing::info;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Start the MCP server.
///
/// Serves `search_resources` and `proxy_tool_call` on stdio until the
/// client disconnects.
pub async fn mcp_server(config: CliConfig) -> CliResult<String> {
    let server_config = config.server_config();

    info!(
        catalog = %server_config.catalog,
        scope = ?server_config.scope.as_fragment(),
        "Starting MCP server"
    );

    // Run the MCP server (this blocks until the client disconnects)
    run_server(server_config)
        .await
        .map_err(|e| CliError::user(format!("MCP server error: {}", e)))?;

    Ok("MCP server stopped.".to_string())
}
