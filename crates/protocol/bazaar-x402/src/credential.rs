//! Caller-supplied payment credentials.
//!
//! A credential arrives as an untyped JSON object in the MCP call's
//! `_meta["x402/payment"]`. [`PaymentCredential::from_value`] validates it
//! once at the boundary and produces one of two closed variants:
//!
//! - **v1** (legacy): `scheme` and `network` sit next to `payload`.
//! - **v2**: the signature travels in an envelope that echoes the `resource`
//!   and the `accepted` requirement it pays for.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{X402Error, X402Result};
use crate::version::detect_version;

/// A validated payment credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaymentCredential {
    /// Legacy (v1) credential.
    V1(CredentialV1),
    /// Enveloped (v2+) credential.
    V2(CredentialV2),
}

/// Legacy payment credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialV1 {
    /// `x402Version` exactly as the caller sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x402_version: Option<Value>,

    /// Payment scheme, if given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// Payment network, if given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Opaque signature/authorization object.
    pub payload: Value,

    /// Any other fields, carried through unchanged.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Enveloped payment credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialV2 {
    /// Detected protocol version (2 or later). Selects the header only.
    #[serde(skip)]
    pub version: u32,

    /// `x402Version` exactly as the caller sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x402_version: Option<Value>,

    /// Resource being paid for (`url`, `description`, `mimeType`).
    pub resource: Map<String, Value>,

    /// The payment requirement the client chose to satisfy.
    pub accepted: Map<String, Value>,

    /// Opaque signature/authorization object.
    pub payload: Value,

    /// Any other fields (e.g. `extensions`), carried through unchanged.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl PaymentCredential {
    /// Parse and validate a credential from call metadata.
    ///
    /// Fails with a validation error for a non-object, a missing payload or
    /// an incomplete v2 envelope, and with [`X402Error::UnknownVersion`]
    /// when the version cannot be determined.
    pub fn from_value(value: &Value) -> X402Result<Self> {
        let object = value.as_object().ok_or(X402Error::NotAnObject)?;

        match object.get("payload") {
            None | Some(Value::Null) => return Err(X402Error::MissingPayload),
            Some(_) => {}
        }

        let version = detect_version(object).ok_or(X402Error::UnknownVersion)?;

        let canonical = canonical_object(object);
        let mut x402_version = None;
        let mut payload = Value::Null;
        let mut resource = None;
        let mut accepted = None;
        let mut scheme = None;
        let mut network = None;
        let mut extensions = Map::new();
        for (key, value) in canonical {
            match (key.as_str(), value) {
                ("x402Version", v) => x402_version = Some(v),
                ("payload", v) => payload = v,
                ("resource", Value::Object(m)) if version >= 2 => resource = Some(m),
                ("accepted", Value::Object(m)) if version >= 2 => accepted = Some(m),
                ("scheme", Value::String(s)) if version < 2 => scheme = Some(s),
                ("network", Value::String(s)) if version < 2 => network = Some(s),
                (_, v) => {
                    extensions.insert(key.clone(), v);
                }
            }
        }

        if version >= 2 {
            return Ok(Self::V2(CredentialV2 {
                version,
                x402_version,
                resource: resource.ok_or(X402Error::MissingEnvelopeField { field: "resource" })?,
                accepted: accepted.ok_or(X402Error::MissingEnvelopeField { field: "accepted" })?,
                payload,
                extensions,
            }));
        }

        Ok(Self::V1(CredentialV1 {
            x402_version,
            scheme,
            network,
            payload,
            extensions,
        }))
    }

    /// Detected protocol version of the credential.
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(c) => c.version,
        }
    }

    /// Canonical JSON bytes of the credential.
    ///
    /// Keys are sorted at every level, so the bytes depend only on the
    /// credential's content.
    pub fn to_canonical_json(&self) -> X402Result<Vec<u8>> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_vec(&canonical_value(&value))?)
    }
}

/// Deep copy of an object with every nested object's keys in sorted order.
fn canonical_object(object: &Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<_> = object.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(k, v)| (k.clone(), canonical_value(v)))
        .collect()
}

fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonical_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}
