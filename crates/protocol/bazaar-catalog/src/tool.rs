//! Discovery resource → tool descriptor synthesis.
//!
//! Every HTTP resource in the catalog becomes one agent-callable tool. The
//! tool name is a pure function of the resource's HTTP method and URL, so
//! the same catalog always yields the same names and a name can be resolved
//! back to its resource without any registry.

use bazaar_x402::{DiscoveryResource, InputDescriptor, META_CALL_WITH, META_PAYMENT_REQUIRED};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{CatalogError, CatalogResult};
use crate::loader::Catalog;

/// Tool that executes every synthesized tool.
pub const PROXY_TOOL_NAME: &str = "proxy_tool_call";

/// Prefix shared by all synthesized tool names.
pub const TOOL_NAME_PREFIX: &str = "x402_";

/// Sentence appended to every synthesized description.
const DESCRIPTION_SUFFIX: &str = "Use proxy_tool_call with payment to execute.";

/// Number of hash bytes (rendered as hex) in a tool name.
const NAME_HASH_BYTES: usize = 4;

/// An agent-callable tool synthesized from a discovery resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Deterministic tool name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// JSON Schema of the `proxy_tool_call` arguments for this tool.
    pub input_schema: Map<String, Value>,

    /// Pricing and routing metadata.
    #[serde(rename = "_meta")]
    pub meta: Map<String, Value>,
}

/// Render a JSON value the way it appears in a URL or header: strings
/// verbatim, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reduce a string to `[a-z0-9_]`, trimming edge underscores.
///
/// ASCII letters are lowercased, digits are kept and every other character
/// becomes `_`. An empty result falls back to `"resource"`.
pub fn sanitize_tool_name(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches('_');
    if trimmed.is_empty() {
        "resource".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Deterministic tool name for a resource URL and optional HTTP method.
///
/// `x402_{method_}{sanitized_url}_{hash}` where `hash` is the hex of the
/// first four bytes of SHA-256 over `"{METHOD}:{url}"`.
pub fn tool_name(url: &str, method: Option<&str>) -> String {
    let method = method.unwrap_or("");

    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let hash = hex::encode(&digest[..NAME_HASH_BYTES]);

    let prefix = if method.is_empty() {
        String::new()
    } else {
        format!("{}_", sanitize_tool_name(&method.to_lowercase()))
    };

    format!(
        "{}{}{}_{}",
        TOOL_NAME_PREFIX,
        prefix,
        sanitize_tool_name(url),
        hash
    )
}

/// The method used for naming: the primary accepts input descriptor's
/// method, else the metadata input descriptor's.
pub fn naming_method(resource: &DiscoveryResource) -> Option<String> {
    resource
        .primary_accepts()
        .and_then(|(_, input)| input)
        .and_then(|input| input.method())
        .or_else(|| resource.metadata_input().and_then(|input| input.method()))
}

/// The HTTP method used when proxying a call (before any body upgrade).
///
/// The primary accepts input descriptor decides; when that yields `GET`
/// (explicitly or by default) the metadata input descriptor may override.
pub fn request_method(resource: &DiscoveryResource) -> String {
    let from_accepts = resource
        .primary_accepts()
        .and_then(|(_, input)| input)
        .and_then(|input| input.method());

    match from_accepts {
        Some(method) if method != "GET" => method,
        _ => resource
            .metadata_input()
            .and_then(|input| input.method())
            .unwrap_or_else(|| "GET".to_string()),
    }
}

/// Synthesize the tool for a resource; `None` unless the resource is HTTP.
pub fn to_tool(resource: &DiscoveryResource) -> Option<ToolDescriptor> {
    if !resource.is_http() {
        return None;
    }

    let (accepts_description, accepts_input) = match resource.primary_accepts() {
        Some((description, input)) => (Some(description).filter(|d| !d.is_empty()), input),
        None => (None, None),
    };

    let base = accepts_description
        .or_else(|| resource.metadata_description())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Proxy call to {}", resource.resource));
    let description = format!("{} {}", base.trim(), DESCRIPTION_SUFFIX);

    let name = tool_name(&resource.resource, naming_method(resource).as_deref());
    let input_schema = input_schema(resource, accepts_input);

    let mut meta = Map::new();
    if let Some(pricing) = pricing_meta(resource, &description, &name) {
        meta.insert(META_PAYMENT_REQUIRED.to_string(), pricing);
    }
    meta.insert(META_CALL_WITH.to_string(), json!({ "tool": PROXY_TOOL_NAME }));

    Some(ToolDescriptor {
        name,
        description,
        input_schema,
        meta,
    })
}

/// String-typed property schema for each declared parameter.
fn string_properties(declared: &Map<String, Value>) -> Map<String, Value> {
    declared
        .iter()
        .map(|(key, value)| {
            let mut prop = Map::new();
            prop.insert("type".into(), json!("string"));
            if !value.is_null() {
                prop.insert("description".into(), Value::String(display_value(value)));
            }
            (key.clone(), Value::Object(prop))
        })
        .collect()
}

fn input_schema(resource: &DiscoveryResource, input: Option<InputDescriptor<'_>>) -> Map<String, Value> {
    let mut parameters = Map::new();

    if let Some(input) = input {
        if let Some(query) = input.query_params() {
            parameters.insert(
                "query".into(),
                json!({
                    "type": "object",
                    "additionalProperties": false,
                    "description": "Query parameters to include on the request.",
                    "properties": string_properties(query),
                }),
            );
        }
        if let Some(headers) = input.headers() {
            parameters.insert(
                "headers".into(),
                json!({
                    "type": "object",
                    "additionalProperties": false,
                    "description": "Additional headers to include on the request.",
                    "properties": string_properties(headers),
                }),
            );
        }
        if input.expects_body() {
            parameters.insert(
                "body".into(),
                json!({ "description": "JSON body to include on the request." }),
            );
        }
    }

    let has_parameters = !parameters.is_empty();
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert(
        "properties".into(),
        json!({
            "parameters": {
                "type": "object",
                "properties": parameters,
            }
        }),
    );
    if let Some(method) = input.and_then(|i| i.method()) {
        schema.insert(
            "description".into(),
            Value::String(format!("HTTP {} to {}", method, resource.resource)),
        );
    }
    if has_parameters {
        schema.insert("required".into(), json!(["parameters"]));
    }
    schema
}

fn pricing_meta(resource: &DiscoveryResource, description: &str, name: &str) -> Option<Value> {
    if resource.accepts.is_empty() {
        return None;
    }

    let accepts: Vec<Value> = resource.accepts.iter().map(|r| r.to_pricing()).collect();

    let mut resource_meta = Map::new();
    resource_meta.insert("url".into(), Value::String(format!("tool://{}", name)));
    resource_meta.insert("description".into(), Value::String(description.to_string()));
    if let Some(mime) = resource.mime_type() {
        resource_meta.insert("mimeType".into(), Value::String(mime.to_string()));
    }

    Some(json!({
        "x402Version": resource.x402_version,
        "resource": resource_meta,
        "accepts": accepts,
    }))
}

impl Catalog {
    /// All tools in listing order, skipping non-HTTP resources.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.resources().iter().filter_map(to_tool).collect()
    }

    /// Find the resource whose synthesized tool has the given name.
    ///
    /// Searches the whole catalog, ignoring any search scope; the first
    /// match in listing order wins.
    pub fn resolve(&self, name: &str) -> CatalogResult<&DiscoveryResource> {
        self.resources()
            .iter()
            .filter(|r| r.is_http())
            .find(|r| tool_name(&r.resource, naming_method(r).as_deref()) == name)
            .ok_or_else(|| CatalogError::ToolNotFound(name.to_string()))
    }
}
