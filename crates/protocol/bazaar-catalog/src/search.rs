//! Catalog search: deployment scope, free-text query and pagination.

use bazaar_x402::{DiscoveryResource, X402_VERSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loader::Catalog;
use crate::tool::{to_tool, ToolDescriptor};

/// URL fragment the catalog is scoped to unless configured otherwise.
pub const DEFAULT_SCOPE: &str = "/weather";

/// Deployment-time restriction of the searchable catalog.
///
/// Resources whose URL contains the fragment (case-insensitively) are in
/// scope. An unscoped search sees every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    fragment: Option<String>,
}

impl ResourceScope {
    /// Every resource is in scope.
    pub fn unscoped() -> Self {
        Self { fragment: None }
    }

    /// Scope to a URL fragment; an empty fragment means unscoped.
    pub fn fragment(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if fragment.is_empty() {
            Self::unscoped()
        } else {
            Self {
                fragment: Some(fragment.to_lowercase()),
            }
        }
    }

    /// The active fragment, if any.
    pub fn as_fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether a resource is in scope.
    pub fn contains(&self, resource: &DiscoveryResource) -> bool {
        match &self.fragment {
            Some(fragment) => resource.resource.to_lowercase().contains(fragment.as_str()),
            None => true,
        }
    }
}

impl Default for ResourceScope {
    fn default() -> Self {
        Self::fragment(DEFAULT_SCOPE)
    }
}

/// Resources within `scope`, in listing order.
pub fn filter_by_scope<'a>(
    items: &'a [DiscoveryResource],
    scope: &ResourceScope,
) -> Vec<&'a DiscoveryResource> {
    items.iter().filter(|r| scope.contains(r)).collect()
}

/// Resources whose URL contains `query` (case-insensitive), in input order.
///
/// An empty query matches everything.
pub fn filter_by_query<'a>(
    items: Vec<&'a DiscoveryResource>,
    query: &str,
) -> Vec<&'a DiscoveryResource> {
    if query.is_empty() {
        return items;
    }
    let query = query.to_lowercase();
    items
        .into_iter()
        .filter(|r| r.resource.to_lowercase().contains(&query))
        .collect()
}

/// Page bookkeeping returned with every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Requested limit, echoed as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Requested offset, echoed as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Number of items before paging.
    pub total: usize,
}

/// Slice one page out of `items`.
///
/// The offset defaults to 0 and is clamped to `[0, total]`. A negative limit
/// means no limit; otherwise the page ends at `offset + limit`, clamped to
/// `total`.
pub fn paginate<T>(items: &[T], limit: Option<i64>, offset: Option<i64>) -> (&[T], PaginationState) {
    let total = items.len();

    let start = match offset {
        Some(o) if o > 0 => usize::try_from(o).unwrap_or(usize::MAX).min(total),
        _ => 0,
    };
    let end = match limit {
        Some(l) if l >= 0 => start
            .saturating_add(usize::try_from(l).unwrap_or(usize::MAX))
            .min(total),
        _ => total,
    };

    (
        &items[start..end],
        PaginationState {
            limit,
            offset,
            total,
        },
    )
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Paging bookkeeping.
    pub pagination: PaginationState,

    /// Version of the first matching resource (1 when nothing matches).
    pub x402_version: u32,

    /// Tools synthesized from the page, skipping non-HTTP resources.
    pub tools: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Scope, filter and page the catalog, then synthesize tools.
    pub fn search(
        &self,
        scope: &ResourceScope,
        query: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> SearchPage {
        let scoped = filter_by_scope(self.resources(), scope);
        let filtered = filter_by_query(scoped, query);
        let (page, pagination) = paginate(&filtered, limit, offset);

        let tools: Vec<ToolDescriptor> = page.iter().filter_map(|r| to_tool(r)).collect();
        let x402_version = filtered
            .first()
            .map(|r| r.x402_version)
            .unwrap_or(X402_VERSION);

        debug!(
            scope = ?scope.as_fragment(),
            query,
            total = pagination.total,
            returned = tools.len(),
            "Catalog searched"
        );

        SearchPage {
            pagination,
            x402_version,
            tools,
        }
    }
}
