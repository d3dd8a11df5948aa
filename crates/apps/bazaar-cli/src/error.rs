//! CLI error types.

use bazaar_catalog::CatalogError;
use bazaar_mcp::McpError;
use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog load or lookup error.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// Proxy or server error.
    #[error("{0}")]
    Mcp(#[from] McpError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors: 1
            Self::User(_) => 1,
            // Not found: 2
            Self::Catalog(CatalogError::ToolNotFound(_))
            | Self::Mcp(McpError::Catalog(CatalogError::ToolNotFound(_))) => 2,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) => 3,
            // Catalog load errors: 4
            Self::Catalog(_) | Self::Mcp(McpError::Catalog(_)) => 4,
            // Upstream errors: 5
            Self::Mcp(McpError::Upstream(_) | McpError::Cancelled) => 5,
            // Invalid call input: 6
            Self::Mcp(_) => 6,
            // IO errors: 9
            Self::Io(_) => 9,
            // JSON/format errors: 10
            Self::Json(_) => 10,
        }
    }

    /// Recovery hint printed under the error line, if any.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Config(_) | Self::Toml(_) => {
                Some("Check the config file passed with --config or remove it to use defaults")
            }
            Self::Catalog(e) => Some(e.suggestion()),
            Self::Mcp(e) => Some(e.suggestion()),
            Self::Json(_) => Some("Pass --params and --payment as JSON objects"),
            Self::Io(_) | Self::User(_) => None,
        }
    }
}
