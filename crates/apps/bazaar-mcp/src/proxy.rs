//! Proxy invoker: executes a synthesized tool against its HTTP resource.
//!
//! ```text
//! toolName + parameters + x402/payment?
//!     │
//!     ├─ payment? ──→ encode header, merge into parameters.headers
//!     ├─ resolve toolName against the full catalog
//!     ├─ build request (method, query, body, headers)
//!     ├─ send (30 s timeout, cancellable), read ≤ 1 MiB
//!     └─ translate: payment-required | {status, headers, body} (+ settlement)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bazaar_catalog::{display_value, request_method, Catalog};
use bazaar_x402::{
    decode_payment_required, decode_payment_response, encode_payment, DiscoveryResource,
    META_PAYMENT_REQUIRED, META_PAYMENT_RESPONSE,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{McpError, McpResult};

/// Maximum number of upstream body bytes kept; the rest is dropped.
pub const MAX_RESPONSE_BYTES: usize = 1 << 20;

/// Network timeout for every upstream request.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

const APPLICATION_JSON: &str = "application/json";

/// Outcome of a proxied call, independent of the MCP wire types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResult {
    /// Text content returned to the agent.
    pub text: String,

    /// Whether the result is error-flagged.
    pub is_error: bool,

    /// Structured content (the payment-required envelope, when present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,

    /// Result metadata (`x402/payment-required`, `x402/payment-response`).
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl ProxyResult {
    /// The payment-required envelope, if the resource demanded payment.
    pub fn payment_required(&self) -> Option<&Value> {
        self.meta.get(META_PAYMENT_REQUIRED)
    }

    /// The settlement envelope, if the resource reported one.
    pub fn payment_response(&self) -> Option<&Value> {
        self.meta.get(META_PAYMENT_RESPONSE)
    }
}

/// Merge an encoded payment header into the call parameters.
///
/// A header of the same name already supplied by the caller is kept.
pub fn inject_payment(
    parameters: Option<Map<String, Value>>,
    payment: &Value,
) -> McpResult<Map<String, Value>> {
    let header = encode_payment(payment)?;
    let mut parameters = parameters.unwrap_or_default();

    match parameters.get_mut("headers") {
        Some(Value::Object(headers)) => {
            if !headers.contains_key(header.name) {
                headers.insert(header.name.to_string(), Value::String(header.value));
            }
        }
        Some(_) => return Err(McpError::HeadersNotObject { header: header.name }),
        None => {
            let mut headers = Map::new();
            headers.insert(header.name.to_string(), Value::String(header.value));
            parameters.insert("headers".to_string(), Value::Object(headers));
        }
    }

    debug!(header = header.name, version = header.version, "Payment header attached");
    Ok(parameters)
}

/// Build the upstream request for a resource and caller parameters.
pub fn build_request(resource: &DiscoveryResource, parameters: &Map<String, Value>) -> McpResult<Request> {
    let mut method = request_method(resource);

    let mut url = Url::parse(&resource.resource)
        .map_err(|e| McpError::InvalidRequest(format!("invalid resource url: {e}")))?;
    merge_query(&mut url, parameters.get("query"));

    let body = match parameters.get("body") {
        None | Some(Value::Null) => None,
        Some(body) => {
            if method == "GET" {
                method = "POST".to_string();
            }
            Some(serde_json::to_vec(body)?)
        }
    };

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|e| McpError::InvalidRequest(format!("invalid method {method}: {e}")))?;
    let mut request = Request::new(method, url);

    let headers = request.headers_mut();
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    }
    if let Some(Value::Object(caller)) = parameters.get("headers") {
        for (name, value) in caller {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| McpError::InvalidRequest(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(&display_value(value))
                .map_err(|e| McpError::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
            headers.insert(name, value);
        }
    }

    if let Some(body) = body {
        *request.body_mut() = Some(body.into());
    }
    Ok(request)
}

/// Overlay caller query parameters on the URL's own and re-encode all
/// keys in sorted order. Caller values replace existing ones.
fn merge_query(url: &mut Url, caller: Option<&Value>) {
    let mut pairs: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        pairs
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    if let Some(Value::Object(query)) = caller {
        for (key, value) in query {
            pairs.insert(key.clone(), vec![display_value(value)]);
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }
    let mut serializer = url.query_pairs_mut();
    serializer.clear();
    for (key, values) in &pairs {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
}

/// Translate an upstream response into a tool result.
pub fn translate(status: u16, headers: &HeaderMap, body: &[u8]) -> McpResult<ProxyResult> {
    if let Some(required) = decode_payment_required(headers, status, body) {
        info!(status, "Upstream requires payment");
        let envelope = Value::Object(required);
        let mut meta = Map::new();
        meta.insert(META_PAYMENT_REQUIRED.to_string(), envelope.clone());
        return Ok(ProxyResult {
            text: serde_json::to_string(&envelope)?,
            is_error: true,
            structured_content: Some(envelope),
            meta,
        });
    }

    let mut header_map: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        header_map
            .entry(name.as_str())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let payload = json!({
        "status": status,
        "headers": header_map,
        "body": String::from_utf8_lossy(body),
    });

    let mut meta = Map::new();
    if let Some(settlement) = decode_payment_response(headers) {
        info!(status, "Upstream settled payment");
        meta.insert(META_PAYMENT_RESPONSE.to_string(), Value::Object(settlement));
    }

    Ok(ProxyResult {
        text: serde_json::to_string_pretty(&payload)?,
        is_error: status >= 400,
        structured_content: None,
        meta,
    })
}

struct UpstreamResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Read at most [`MAX_RESPONSE_BYTES`] of the response body.
async fn read_capped(response: &mut reqwest::Response) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = MAX_RESPONSE_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Executes synthesized tools against their upstream resources.
#[derive(Debug, Clone)]
pub struct ProxyInvoker {
    catalog: Arc<Catalog>,
    client: reqwest::Client,
}

impl ProxyInvoker {
    /// Create an invoker with a client using the fixed upstream timeout.
    pub fn new(catalog: Arc<Catalog>) -> McpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| McpError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(catalog, client))
    }

    /// Create an invoker with a caller-provided client.
    pub fn with_client(catalog: Arc<Catalog>, client: reqwest::Client) -> Self {
        Self { catalog, client }
    }

    /// The catalog tool names are resolved against.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Run one proxied call.
    ///
    /// Caller-input problems come back as `Err` with a non-fatal
    /// [`McpError`]; the caller decides how to render them.
    pub async fn invoke(
        &self,
        tool_name: &str,
        parameters: Option<Map<String, Value>>,
        payment: Option<&Value>,
        cancel: &CancellationToken,
    ) -> McpResult<ProxyResult> {
        if tool_name.is_empty() {
            return Err(McpError::MissingToolName);
        }

        let parameters = match payment {
            Some(payment) if !payment.is_null() => inject_payment(parameters, payment)?,
            _ => parameters.unwrap_or_default(),
        };

        let resource = self.catalog.resolve(tool_name)?;
        let request = build_request(resource, &parameters)?;
        debug!(
            tool = tool_name,
            method = %request.method(),
            url = %request.url(),
            "Proxying tool call"
        );

        let exchange = async {
            let mut response = self.client.execute(request).await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = read_capped(&mut response).await?;
            Ok::<_, reqwest::Error>(UpstreamResponse {
                status,
                headers,
                body,
            })
        };

        let upstream = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(tool = tool_name, "Proxy call cancelled");
                return Err(McpError::Cancelled);
            }
            result = exchange => result.map_err(|e| {
                warn!(tool = tool_name, error = %e, "Upstream request failed");
                McpError::Upstream(e.to_string())
            })?,
        };

        info!(
            tool = tool_name,
            status = upstream.status,
            bytes = upstream.body.len(),
            "Upstream responded"
        );
        translate(upstream.status, &upstream.headers, &upstream.body)
    }
}
