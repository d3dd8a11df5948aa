//! Error types for the MCP server.

use bazaar_catalog::CatalogError;
use bazaar_x402::X402Error;
use thiserror::Error;

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

/// Error types for MCP server operations.
#[derive(Debug, Error)]
pub enum McpError {
    /// `proxy_tool_call` was invoked without a tool name.
    #[error("'toolName' parameter is required")]
    MissingToolName,

    /// The `x402/payment` metadata was rejected.
    #[error("invalid x402 payment metadata: {0}")]
    PaymentMeta(#[from] X402Error),

    /// `parameters.headers` is present but not an object, so the payment
    /// header cannot be merged into it.
    #[error("invalid x402 payment metadata: headers must be an object to set {header}")]
    HeadersNotObject {
        /// Payment header that could not be set.
        header: &'static str,
    },

    /// Catalog load failure or unknown tool name.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The upstream request could not be built from the resource and
    /// caller parameters.
    #[error("failed to build proxy request: {0}")]
    InvalidRequest(String),

    /// The upstream resource could not be reached or its body not read.
    #[error("proxy request failed: {0}")]
    Upstream(String),

    /// The caller cancelled the invocation.
    #[error("proxy request cancelled")]
    Cancelled,

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl McpError {
    /// Short machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToolName | Self::HeadersNotObject { .. } => "VALIDATION_ERROR",
            Self::PaymentMeta(e) if e.is_validation() => "VALIDATION_ERROR",
            Self::PaymentMeta(X402Error::Decode(_)) => "DECODE_ERROR",
            Self::PaymentMeta(_) => "ENCODE_ERROR",
            Self::Catalog(CatalogError::ToolNotFound(_)) => "NOT_FOUND",
            Self::Catalog(_) => "LOAD_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::MissingToolName => "Pass a toolName returned by search_resources",
            Self::PaymentMeta(e) => e.suggestion(),
            Self::HeadersNotObject { .. } => "Pass parameters.headers as an object of header names to values",
            Self::Catalog(e) => e.suggestion(),
            Self::InvalidRequest(_) => "Check the query, header and body parameters",
            Self::Upstream(_) => "The resource may be down; try again later",
            Self::Cancelled => "Retry the call if the result is still needed",
            Self::Serialization(_) => "Report this as a bug",
        }
    }

    /// Whether the error aborts the invocation instead of being returned to
    /// the agent as an error-flagged tool result.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::Cancelled | Self::Serialization(_)
        ) || matches!(self, Self::Catalog(e) if e.is_load_error())
    }
}
