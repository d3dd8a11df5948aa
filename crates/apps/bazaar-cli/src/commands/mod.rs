//! CLI command implementations.

pub mod call;
pub mod mcp_server;
pub mod search;

// Re-export command handlers
pub use call::call;
pub use mcp_server::mcp_server;
pub use search::search;
