//! Command-line interface for the Bazaar x402 MCP bridge.
//!
//! This crate provides the `bazaar` binary. It includes commands for:
//!
//! - **MCP**: serve `search_resources` and `proxy_tool_call` on stdio
//! - **Discovery**: list catalog resources as tools
//! - **Calls**: run one proxied call, optionally with a signed payment
//!
//! # Quick Start
//!
//! ```bash
//! # List weather tools
//! bazaar search
//!
//! # Call one of them
//! bazaar call x402_get_https___api_example_com_weather_1a2b3c4d --params '{"query":{"city":"SF"}}'
//!
//! # Serve MCP for an assistant
//! bazaar mcp-server
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from the platform config directory
//! (`config.toml`). Override with `--config`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

// Re-export main types
pub use cli::{Cli, Commands, OutputFormatArg};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
