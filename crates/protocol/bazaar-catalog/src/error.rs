//! Error types for catalog operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while loading or querying the discovery catalog.
///
/// Cloneable so a failed load can be cached and handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {reason}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The catalog is not a valid `{"items": [...]}` document.
    #[error("failed to parse catalog: {reason}")]
    Parse {
        /// Underlying JSON error message.
        reason: String,
    },

    /// No tool-eligible resource produces the requested tool name.
    #[error("tool \"{0}\" not found")]
    ToolNotFound(String),
}

impl CatalogError {
    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Read { .. } => "Check the [catalog] fixture path in your configuration",
            Self::Parse { .. } => "The catalog must be a JSON object with an `items` array",
            Self::ToolNotFound(_) => "Use search_resources to discover available tool names",
        }
    }

    /// Whether this error means the catalog itself is unusable.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            reason: e.to_string(),
        }
    }
}
