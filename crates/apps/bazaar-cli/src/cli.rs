//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Bazaar x402 bridge CLI.
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(author = "Bazaar Contributors")]
#[command(version)]
#[command(about = "Expose x402 payment-protected HTTP resources as MCP tools")]
#[command(
    long_about = "Bazaar turns an x402 discovery listing into MCP tools and proxies paid calls to the underlying HTTP resources.\n\nRun 'bazaar mcp-server' from an MCP client to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "BAZAAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Discovery listing to load instead of the bundled one.
    #[arg(long, global = true, env = "BAZAAR_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// URL fragment resources must contain to be listed (empty disables scoping).
    #[arg(long, global = true, env = "BAZAAR_SCOPE")]
    pub scope: Option<String>,

    /// Output format (human or json).
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormatArg,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormatArg {
    /// Human-readable output.
    Human,
    /// JSON output.
    #[default]
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start MCP server for AI assistant integration.
    ///
    /// Runs an MCP server on stdio exposing `search_resources` and
    /// `proxy_tool_call` until the client disconnects.
    McpServer,

    /// List catalog resources as tools.
    ///
    /// Prints the same page `search_resources` returns.
    Search {
        /// Case-insensitive substring matched against resource URLs.
        query: Option<String>,

        /// Maximum tools to return (negative for no limit).
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Number of tools to skip.
        #[arg(short, long, allow_hyphen_values = true)]
        offset: Option<i64>,
    },

    /// Run one proxied tool call.
    ///
    /// Resolves the tool name, sends the HTTP request and prints the
    /// translated result.
    Call {
        /// Tool name returned by `search`.
        tool_name: String,

        /// Call parameters as a JSON object (`query`, `headers`, `body`).
        #[arg(short, long)]
        params: Option<String>,

        /// Signed x402 payment as a JSON object.
        #[arg(long, env = "BAZAAR_PAYMENT")]
        payment: Option<String>,
    },
}
