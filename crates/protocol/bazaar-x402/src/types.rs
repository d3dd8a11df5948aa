//! x402 discovery types.
//!
//! Mirrors the discovery ("bazaar") listing format: each item describes one
//! payment-protected HTTP endpoint together with the payment options it
//! accepts. See: https://github.com/coinbase/x402/blob/main/specs/x402-specification.md

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default x402 protocol version assumed when a listing omits it.
pub const X402_VERSION: u32 = 1;

/// HTTP header carrying a v1 payment (client → server).
pub const HEADER_X_PAYMENT: &str = "X-PAYMENT";

/// HTTP header carrying a v2 payment (client → server).
pub const HEADER_PAYMENT_SIGNATURE: &str = "PAYMENT-SIGNATURE";

/// HTTP header carrying payment requirements (server → client).
pub const HEADER_PAYMENT_REQUIRED: &str = "PAYMENT-REQUIRED";

/// HTTP header carrying the settlement result (server → client, v2).
pub const HEADER_PAYMENT_RESPONSE: &str = "PAYMENT-RESPONSE";

/// HTTP header carrying the settlement result (server → client, v1).
pub const HEADER_X_PAYMENT_RESPONSE: &str = "X-PAYMENT-RESPONSE";

/// MCP `_meta` key holding the caller's payment credential.
pub const META_PAYMENT: &str = "x402/payment";

/// MCP `_meta` key holding payment requirements.
pub const META_PAYMENT_REQUIRED: &str = "x402/payment-required";

/// MCP `_meta` key holding the settlement result.
pub const META_PAYMENT_RESPONSE: &str = "x402/payment-response";

/// MCP `_meta` key naming the tool that executes a discovered tool.
pub const META_CALL_WITH: &str = "x402/call-with";

/// The only resource type that can be turned into a tool.
pub const RESOURCE_TYPE_HTTP: &str = "http";

// =============================================================================
// Discovery Resources
// =============================================================================

/// One payment-protected HTTP endpoint from a discovery listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResource {
    /// Absolute URL of the resource. Unique within a catalog.
    pub resource: String,

    /// Resource type (only `"http"` resources are tool-eligible).
    #[serde(rename = "type")]
    pub kind: String,

    /// x402 protocol major version spoken by the resource.
    #[serde(default = "default_x402_version")]
    pub x402_version: u32,

    /// When the listing was last refreshed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Accepted payment options. Empty means the resource is free.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepts: Vec<PaymentRequirement>,

    /// Free-form metadata; may carry a fallback `input` descriptor and a
    /// `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

fn default_x402_version() -> u32 {
    X402_VERSION
}

impl DiscoveryResource {
    /// Whether the resource can be exposed as a tool.
    pub fn is_http(&self) -> bool {
        self.kind.eq_ignore_ascii_case(RESOURCE_TYPE_HTTP)
    }

    /// The `metadata.input` descriptor, if present and an object.
    pub fn metadata_input(&self) -> Option<InputDescriptor<'_>> {
        self.metadata
            .as_ref()?
            .get("input")?
            .as_object()
            .map(InputDescriptor::new)
    }

    /// The non-empty `metadata.description`, if any.
    pub fn metadata_description(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get("description")?
            .as_str()
            .filter(|d| !d.is_empty())
    }

    /// The first requirement that carries either a description or an input
    /// descriptor, as `(description, input)`.
    ///
    /// Both values always come from the same requirement.
    pub fn primary_accepts(&self) -> Option<(&str, Option<InputDescriptor<'_>>)> {
        self.accepts.iter().find_map(|req| {
            let input = req.input();
            if req.description.is_empty() && input.is_none() {
                None
            } else {
                Some((req.description.as_str(), input))
            }
        })
    }

    /// The first non-empty MIME type among the accepted requirements.
    pub fn mime_type(&self) -> Option<&str> {
        self.accepts
            .iter()
            .map(|req| req.mime_type.as_str())
            .find(|m| !m.is_empty())
    }
}

/// A single accepted payment option for a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRequirement {
    /// Payment scheme (e.g., "exact").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scheme: String,

    /// Chain/network identifier (e.g., "base-sepolia" or "eip155:84532").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network: String,

    /// Token identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub asset: String,

    /// Recipient address.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pay_to: String,

    /// Maximum amount in the asset's smallest unit, as a decimal string.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_amount_required: String,

    /// Maximum time in seconds the payment is valid after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,

    /// MIME type of the resource response.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mime_type: String,

    /// Human-readable description of the resource.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Resource URL this requirement was issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Scheme-specific extra data (e.g., EIP-712 domain name/version).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,

    /// Output schema; its `input` member describes the HTTP call shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Map<String, Value>>,
}

impl PaymentRequirement {
    /// The `outputSchema.input` descriptor, if present and an object.
    pub fn input(&self) -> Option<InputDescriptor<'_>> {
        self.output_schema
            .as_ref()?
            .get("input")?
            .as_object()
            .map(InputDescriptor::new)
    }

    /// The pricing entry advertised in tool metadata.
    ///
    /// Absent fields are rendered as `null`.
    pub fn to_pricing(&self) -> Value {
        fn non_empty(s: &str) -> Value {
            if s.is_empty() {
                Value::Null
            } else {
                Value::String(s.to_string())
            }
        }

        serde_json::json!({
            "scheme": non_empty(&self.scheme),
            "network": non_empty(&self.network),
            "amount": non_empty(&self.max_amount_required),
            "asset": non_empty(&self.asset),
            "payTo": non_empty(&self.pay_to),
            "maxTimeoutSeconds": self.max_timeout_seconds,
            "extra": self.extra,
        })
    }
}

// =============================================================================
// Input Descriptor
// =============================================================================

/// Read-only view over an input descriptor object.
///
/// Kept as a view over the raw map because the presence of `body` matters
/// even when its value is `null`.
#[derive(Debug, Clone, Copy)]
pub struct InputDescriptor<'a> {
    raw: &'a Map<String, Value>,
}

impl<'a> InputDescriptor<'a> {
    /// Wrap a raw descriptor object.
    pub fn new(raw: &'a Map<String, Value>) -> Self {
        Self { raw }
    }

    /// The HTTP method in upper case, if present and non-empty.
    pub fn method(&self) -> Option<String> {
        self.raw
            .get("method")?
            .as_str()
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase)
    }

    /// Declared query parameters (name → description), if non-empty.
    pub fn query_params(&self) -> Option<&'a Map<String, Value>> {
        self.non_empty_object("queryParams")
    }

    /// Declared headers (name → description), if non-empty.
    pub fn headers(&self) -> Option<&'a Map<String, Value>> {
        self.non_empty_object("headers")
    }

    /// Whether the endpoint expects a request body.
    pub fn expects_body(&self) -> bool {
        self.raw.contains_key("body")
    }

    fn non_empty_object(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.raw
            .get(key)?
            .as_object()
            .filter(|map| !map.is_empty())
    }
}
