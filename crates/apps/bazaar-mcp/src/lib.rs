//! MCP (Model Context Protocol) server for the Bazaar x402 bridge.
//!
//! This crate provides an MCP server that lets AI assistants discover
//! payment-protected HTTP resources and call them with an x402 payment.
//!
//! # Overview
//!
//! The MCP server exposes two tools:
//!
//! - **search_resources**: List catalog resources as callable tools, with
//!   pricing under `_meta["x402/payment-required"]`
//! - **proxy_tool_call**: Execute a listed tool; the payment travels in the
//!   call's `_meta["x402/payment"]`
//!
//! # Usage
//!
//! The server is typically started via the CLI:
//!
//! ```bash
//! bazaar mcp-server
//! ```
//!
//! Or configured in Claude Desktop's MCP config:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "bazaar": {
//!       "command": "bazaar",
//!       "args": ["mcp-server"]
//!     }
//!   }
//! }
//! ```
//!
//! # Payment Flow
//!
//! 1. Call `proxy_tool_call` without payment; a paid resource answers with an
//!    error-flagged result carrying the payment requirements.
//! 2. Sign a payment for one of the requirements and repeat the call with it
//!    under `_meta["x402/payment"]`.
//! 3. On success the settlement appears under `_meta["x402/payment-response"]`.

pub mod error;
pub mod proxy;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use proxy::{
    build_request, inject_payment, translate, ProxyInvoker, ProxyResult, MAX_RESPONSE_BYTES,
    UPSTREAM_TIMEOUT,
};
pub use server::{run_server, BazaarMcpServer, McpServerConfig};
pub use tools::{ProxyToolCallInput, SearchResourcesInput, SearchResourcesOutput};
