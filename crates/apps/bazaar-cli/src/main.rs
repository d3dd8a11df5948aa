//! Bazaar CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bazaar_cli::{
    cli::{Cli, Commands},
    commands,
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
    output::OutputFormat,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on --verbose flag or RUST_LOG env var.
    // Logs go to stderr; stdout carries the MCP stdio transport.
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if cli.verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if cli.verbose {
            if let Ok(directive) = "bazaar=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Print a user-friendly error message with recovery hint.
fn print_error(e: &CliError) {
    eprintln!("{}: {}", "Error".red().bold(), e);

    if let Some(suggestion) = e.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    // Load configuration, then let flags override it
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = CliConfig::load(&config_path)?.with_overrides(cli.fixture, cli.scope);

    let format: OutputFormat = cli.format.into();

    match cli.command {
        Commands::McpServer => commands::mcp_server(config).await,

        Commands::Search {
            query,
            limit,
            offset,
        } => commands::search(config, format, query.as_deref(), limit, offset),

        Commands::Call {
            tool_name,
            params,
            payment,
        } => {
            commands::call(
                config,
                format,
                &tool_name,
                params.as_deref(),
                payment.as_deref(),
            )
            .await
        }
    }
}
