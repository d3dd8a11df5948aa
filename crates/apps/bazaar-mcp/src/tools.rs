//! MCP tool input/output types.
//!
//! The server exposes two tools:
//! - `search_resources` lists catalog resources as callable tool descriptors
//! - `proxy_tool_call` executes one of those descriptors against its HTTP
//!   resource, attaching the payment from `_meta["x402/payment"]`

use rmcp::schemars;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// search_resources Tool
// ============================================================================

/// Input for the `search_resources` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResourcesInput {
    /// Search string for filtering resources by URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Optional pagination limit. Negative means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Optional pagination offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Output from the `search_resources` tool:
/// `{pagination, x402Version, tools[]}`.
pub type SearchResourcesOutput = bazaar_catalog::SearchPage;

// ============================================================================
// proxy_tool_call Tool
// ============================================================================

/// Input for the `proxy_tool_call` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyToolCallInput {
    /// Tool name to proxy, as returned by `search_resources`.
    #[serde(default)]
    pub tool_name: String,

    /// Tool parameters for the proxied call: `query`, `headers` and `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}
