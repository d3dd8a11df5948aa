//! Search command implementation.

use bazaar_catalog::CatalogLoader;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{OutputFormat, Render};

/// List catalog resources as tools, scoped and paginated like
/// `search_resources`.
pub fn search(
    config: CliConfig,
    format: OutputFormat,
    query: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> CliResult<String> {
    let server_config = config.server_config();
    let catalog = CatalogLoader::new(server_config.catalog).load()?;
    debug!(resources = catalog.len(), "Catalog loaded");

    let page = catalog.search(&server_config.scope, query.unwrap_or(""), limit, offset);
    Ok(page.render(format))
}
