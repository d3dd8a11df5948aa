//! x402 discovery catalog for the Bazaar bridge.
//!
//! Turns a static listing of payment-protected HTTP resources into
//! agent-callable tool descriptors.
//!
//! # Components
//!
//! - **[`loader`]**: one-shot catalog loading from a file or the bundled fixture
//! - **[`search`]**: deployment scope, text query and pagination
//! - **[`tool`]**: deterministic tool synthesis and tool-name resolution
//! - **[`error`]**: error types with recovery suggestions
//!
//! # Usage
//!
//! ```rust
//! use bazaar_catalog::{bundled, ResourceScope};
//!
//! let catalog = bundled().unwrap();
//! let page = catalog.search(&ResourceScope::default(), "weather", Some(10), None);
//! for tool in &page.tools {
//!     assert!(catalog.resolve(&tool.name).is_ok());
//! }
//! ```

pub mod error;
pub mod loader;
pub mod search;
pub mod tool;

pub use error::{CatalogError, CatalogResult};
pub use loader::{bundled, Catalog, CatalogLoader, CatalogSource, BUNDLED_FIXTURE};
pub use search::{
    filter_by_query, filter_by_scope, paginate, PaginationState, ResourceScope, SearchPage,
    DEFAULT_SCOPE,
};
pub use tool::{
    display_value, naming_method, request_method, sanitize_tool_name, to_tool, tool_name,
    ToolDescriptor, PROXY_TOOL_NAME, TOOL_NAME_PREFIX,
};
