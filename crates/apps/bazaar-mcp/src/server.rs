//! MCP server implementation for the Bazaar bridge.
//!
//! Uses the RMCP SDK to expose x402 discovery and paid proxy calls to AI
//! assistants.

use std::sync::Arc;

use bazaar_catalog::{Catalog, CatalogLoader, CatalogSource, ResourceScope};
use bazaar_x402::META_PAYMENT;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{McpError as BazaarMcpError, McpResult};
use crate::proxy::{ProxyInvoker, ProxyResult};
use crate::tools::{ProxyToolCallInput, SearchResourcesInput, SearchResourcesOutput};

/// Create a standardized error response for MCP tools.
///
/// Returns a JSON-formatted error with error kind, message, and recovery suggestion.
fn tool_error(error: &BazaarMcpError) -> CallToolResult {
    let response = serde_json::json!({
        "error": error.kind(),
        "message": error.to_string(),
        "suggestion": error.suggestion(),
    });
    CallToolResult::error(vec![Content::text(response.to_string())])
}

/// Convert a fatal error into a protocol-level error.
fn protocol_error(error: &BazaarMcpError) -> McpError {
    McpError::internal_error(
        error.to_string(),
        Some(serde_json::json!({ "error": error.kind() })),
    )
}

/// Convert a proxy outcome into the MCP result shape.
fn to_call_tool_result(result: ProxyResult) -> CallToolResult {
    let content = vec![Content::text(result.text)];
    let mut call = if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    };
    call.structured_content = result.structured_content;
    if !result.meta.is_empty() {
        call.meta = Some(Meta(result.meta));
    }
    call
}

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Where the discovery catalog is read from.
    pub catalog: CatalogSource,
    /// Deployment scope applied to `search_resources`.
    pub scope: ResourceScope,
    /// Server name reported to clients. `bazaar-mcp` when unset.
    pub name: Option<String>,
    /// Server version reported to clients. This package's version when unset.
    pub version: Option<String>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::Bundled,
            scope: ResourceScope::default(),
            name: None,
            version: None,
        }
    }
}

/// Bazaar MCP Server.
///
/// Implements the MCP server handler with `search_resources` and
/// `proxy_tool_call` tools.
#[derive(Clone)]
pub struct BazaarMcpServer {
    /// Proxy invoker (owns the catalog and HTTP client).
    invoker: Arc<ProxyInvoker>,
    /// Search scope.
    scope: ResourceScope,
    /// Reported server identity.
    implementation: Implementation,
    /// Tool router for MCP.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BazaarMcpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails if the catalog cannot be loaded.
    pub fn new(config: McpServerConfig) -> McpResult<Self> {
        let catalog = match &config.catalog {
            CatalogSource::Bundled => bazaar_catalog::bundled()?,
            source => CatalogLoader::new(source.clone()).load()?,
        };
        let invoker = ProxyInvoker::new(catalog)?;
        Ok(Self::with_invoker(invoker, config))
    }

    /// Create a server around an existing invoker.
    pub fn with_invoker(invoker: ProxyInvoker, config: McpServerConfig) -> Self {
        let implementation = Implementation {
            name: config
                .name
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
            version: config
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            ..Implementation::from_build_env()
        };

        info!(
            resources = invoker.catalog().len(),
            scope = ?config.scope.as_fragment(),
            "MCP server initialized"
        );

        Self {
            invoker: Arc::new(invoker),
            scope: config.scope,
            implementation,
            tool_router: Self::described_tool_router(),
        }
    }

    /// Create a server over an in-memory catalog.
    pub fn from_catalog(catalog: Arc<Catalog>, config: McpServerConfig) -> McpResult<Self> {
        Ok(Self::with_invoker(ProxyInvoker::new(catalog)?, config))
    }

    /// Run a search against the scoped catalog.
    pub fn search(&self, input: &SearchResourcesInput) -> SearchResourcesOutput {
        self.invoker.catalog().search(
            &self.scope,
            input.search_query.as_deref().unwrap_or(""),
            input.limit,
            input.offset,
        )
    }

    /// Run one proxied call, rendering caller errors as error results.
    pub async fn proxy(
        &self,
        input: ProxyToolCallInput,
        payment: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = %input.tool_name, paid = payment.is_some(), "Processing proxy_tool_call request");

        match self
            .invoker
            .invoke(&input.tool_name, input.parameters, payment, cancel)
            .await
        {
            Ok(result) => Ok(to_call_tool_result(result)),
            Err(e) if e.is_fatal() => Err(protocol_error(&e)),
            Err(e) => {
                warn!(tool = %input.tool_name, error = %e, "proxy_tool_call rejected");
                Ok(tool_error(&e))
            }
        }
    }

    /// Discover x402 resources as callable tools.
    #[tool(
        description = "Discover additional x402 tools you can use. Use searchQuery to filter by text. After discovery, execute a returned tool via proxy_tool_call with a payment attached in meta x402/payment."
    )]
    async fn search_resources(
        &self,
        Parameters(input): Parameters<SearchResourcesInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(query = ?input.search_query, limit = ?input.limit, offset = ?input.offset, "Processing search_resources request");

        let output = self.search(&input);
        info!(
            total = output.pagination.total,
            returned = output.tools.len(),
            "Listed resources"
        );

        let value = serde_json::to_value(&output)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let mut result = CallToolResult::success(vec![Content::text(json)]);
        result.structured_content = Some(value);
        Ok(result)
    }

    /// Execute a discovered x402 tool.
    #[tool(
        description = "Executes a discovered x402 tool. Provide toolName and parameters. Use search_resources to discover available tools."
    )]
    async fn proxy_tool_call(
        &self,
        Parameters(input): Parameters<ProxyToolCallInput>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let payment = context.meta.get(META_PAYMENT).cloned();
        self.proxy(input, payment.as_ref(), &context.ct).await
    }
}

/// Structured output of `search_resources`.
fn search_output_schema() -> JsonObject {
    let open_object = serde_json::json!({"type": "object", "additionalProperties": true});
    let schema = serde_json::json!({
        "type": "object",
        "properties": {
            "pagination": {
                "type": "object",
                "properties": {
                    "limit": {"type": "integer"},
                    "offset": {"type": "integer"},
                    "total": {"type": "integer"}
                },
                "additionalProperties": false
            },
            "x402Version": {"type": "integer"},
            "tools": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "_meta": open_object,
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "inputSchema": open_object,
                        "outputSchema": open_object,
                        "title": {"type": "string"},
                        "annotations": open_object
                    },
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false
    });
    match schema {
        serde_json::Value::Object(object) => object,
        _ => JsonObject::new(),
    }
}

/// Mark `toolName` required in the advertised input schema.
///
/// The field still deserializes to an empty name when absent so the
/// handler can answer with a validation result.
fn require_tool_name(schema: &JsonObject) -> JsonObject {
    let mut schema = schema.clone();
    if let Some(serde_json::Value::Object(properties)) = schema.get_mut("properties") {
        if let Some(serde_json::Value::Object(tool_name)) = properties.get_mut("toolName") {
            tool_name.remove("default");
        }
    }
    schema.insert("required".into(), serde_json::json!(["toolName"]));
    schema
}

impl BazaarMcpServer {
    /// Tool router with titles and schemas the tool attributes don't carry.
    fn described_tool_router() -> ToolRouter<Self> {
        let mut router = Self::tool_router();
        if let Some(route) = router.map.get_mut("search_resources") {
            route.attr.title = Some("Search x402 Tools".into());
            route.attr.output_schema = Some(Arc::new(search_output_schema()));
        }
        if let Some(route) = router.map.get_mut("proxy_tool_call") {
            route.attr.title = Some("Execute x402 Tool".into());
            route.attr.input_schema = Arc::new(require_tool_name(&route.attr.input_schema));
        }
        router
    }
}

#[tool_handler]
impl rmcp::ServerHandler for BazaarMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: self.implementation.clone(),
            instructions: Some(
                "Bazaar MCP Server - Discover and call x402 payment-protected HTTP resources. \
                 Use `search_resources` to list tools, then `proxy_tool_call` with the tool name. \
                 Attach a signed payment under `_meta[\"x402/payment\"]`; payment requirements \
                 come back under `_meta[\"x402/payment-required\"]` and settlements under \
                 `_meta[\"x402/payment-response\"]`."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server on stdio transport.
pub async fn run_server(config: McpServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Bazaar MCP server");

    let server = BazaarMcpServer::new(config)?;
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
