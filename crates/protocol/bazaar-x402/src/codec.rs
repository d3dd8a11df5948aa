//! x402 HTTP header codec.
//!
//! All x402 headers carry base64-encoded JSON. Outgoing values use the
//! padded standard alphabet; incoming values are also accepted unpadded.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::credential::PaymentCredential;
use crate::error::{X402Error, X402Result};
use crate::types::{
    HEADER_PAYMENT_REQUIRED, HEADER_PAYMENT_RESPONSE, HEADER_PAYMENT_SIGNATURE, HEADER_X_PAYMENT,
    HEADER_X_PAYMENT_RESPONSE,
};
use crate::version::detect_version;

/// HTTP status code for "Payment Required".
pub const STATUS_PAYMENT_REQUIRED: u16 = 402;

/// An encoded payment header ready to attach to an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHeader {
    /// Header name (`X-PAYMENT` for v1, `PAYMENT-SIGNATURE` for v2+).
    pub name: &'static str,
    /// Base64 of the canonical JSON credential.
    pub value: String,
    /// Protocol version the header was built for.
    pub version: u32,
}

/// Header name used to carry a payment of the given version.
pub fn payment_header_name(version: u32) -> &'static str {
    if version >= 2 {
        HEADER_PAYMENT_SIGNATURE
    } else {
        HEADER_X_PAYMENT
    }
}

/// Encode a validated credential as a payment header.
pub fn encode_credential(credential: &PaymentCredential) -> X402Result<PaymentHeader> {
    let json = credential.to_canonical_json()?;
    let version = credential.version();
    Ok(PaymentHeader {
        name: payment_header_name(version),
        value: STANDARD.encode(json),
        version,
    })
}

/// Validate raw payment metadata and encode it as a payment header.
pub fn encode_payment(payment: &Value) -> X402Result<PaymentHeader> {
    let credential = PaymentCredential::from_value(payment)?;
    encode_credential(&credential)
}

/// Decode a base64 JSON-object header value.
pub fn decode_header(value: &str) -> X402Result<Map<String, Value>> {
    let trimmed = value.trim();
    let bytes = STANDARD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| X402Error::Decode(format!("base64: {e}")))?;
    serde_json::from_slice::<Map<String, Value>>(&bytes)
        .map_err(|e| X402Error::Decode(format!("json: {e}")))
}

/// Decode a header value, treating empty or malformed values as absent.
pub fn decode_header_value(value: &str) -> Option<Map<String, Value>> {
    if value.trim().is_empty() {
        return None;
    }
    match decode_header(value) {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable x402 header");
            None
        }
    }
}

fn header_object(headers: &HeaderMap, name: &str) -> Option<Map<String, Value>> {
    let value = headers.get(name)?.to_str().ok()?;
    decode_header_value(value)
}

/// Extract payment requirements from an upstream response.
///
/// The `PAYMENT-REQUIRED` header wins. Without it, a 402 body is accepted
/// only when it is a v1 requirements object (it must carry `accepts`).
pub fn decode_payment_required(
    headers: &HeaderMap,
    status: u16,
    body: &[u8],
) -> Option<Map<String, Value>> {
    if let Some(required) = header_object(headers, HEADER_PAYMENT_REQUIRED) {
        return Some(required);
    }
    if status != STATUS_PAYMENT_REQUIRED || body.is_empty() {
        return None;
    }

    let decoded: Map<String, Value> = serde_json::from_slice(body).ok()?;
    if detect_version(&decoded)? != 1 {
        return None;
    }
    match decoded.get("accepts") {
        None | Some(Value::Null) => None,
        Some(_) => Some(decoded),
    }
}

/// Extract the settlement result from an upstream response.
pub fn decode_payment_response(headers: &HeaderMap) -> Option<Map<String, Value>> {
    header_object(headers, HEADER_PAYMENT_RESPONSE)
        .or_else(|| header_object(headers, HEADER_X_PAYMENT_RESPONSE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn encode(value: &Value) -> String {
        STANDARD.encode(serde_json::to_vec(value).unwrap())
    }

    fn headers(pairs: &[(&'static str, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_v2_payment_uses_signature_header() {
        let payment = json!({
            "x402Version": 2,
            "resource": {"url": "tool://financial_analysis"},
            "accepted": {"scheme": "exact", "network": "eip155:84532"},
            "payload": {"signature": "0xdeadbeef"}
        });
        let header = encode_payment(&payment).unwrap();
        assert_eq!(header.name, "PAYMENT-SIGNATURE");
        assert_eq!(header.version, 2);

        let decoded = decode_header(&header.value).unwrap();
        assert_eq!(Value::Object(decoded), payment);
    }

    #[test]
    fn test_v1_payment_uses_x_payment_header() {
        let payment = json!({
            "x402Version": 1,
            "scheme": "exact",
            "network": "base-sepolia",
            "payload": {"signature": "0xfeed"}
        });
        let header = encode_payment(&payment).unwrap();
        assert_eq!(header.name, "X-PAYMENT");
        assert_eq!(header.version, 1);
        assert_eq!(Value::Object(decode_header(&header.value).unwrap()), payment);
    }

    #[test]
    fn test_v2_header_bytes_match_canonical_json() {
        let payment = json!({
            "x402Version": 2,
            "resource": {"url": "tool://financial_analysis", "mimeType": "application/json"},
            "accepted": {"scheme": "exact", "network": "eip155:84532", "amount": "10000"},
            "payload": {"signature": "0xdeadbeef", "authorization": {"nonce": "0x01", "from": "0xabc"}},
            "extensions": {"bazaar": true}
        });
        let credential = PaymentCredential::from_value(&payment).unwrap();
        let header = encode_credential(&credential).unwrap();

        let bytes = STANDARD.decode(&header.value).unwrap();
        assert_eq!(bytes, credential.to_canonical_json().unwrap());
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            concat!(
                r#"{"accepted":{"amount":"10000","network":"eip155:84532","scheme":"exact"},"#,
                r#""extensions":{"bazaar":true},"#,
                r#""payload":{"authorization":{"from":"0xabc","nonce":"0x01"},"signature":"0xdeadbeef"},"#,
                r#""resource":{"mimeType":"application/json","url":"tool://financial_analysis"},"#,
                r#""x402Version":2}"#
            )
        );
    }

    #[test]
    fn test_envelope_with_v1_field_keeps_caller_version() {
        let payment = json!({
            "x402Version": 1,
            "resource": {"url": "tool://weather"},
            "accepted": {"scheme": "exact"},
            "payload": {"signature": "0x1"}
        });
        let header = encode_payment(&payment).unwrap();
        assert_eq!(header.name, "PAYMENT-SIGNATURE");
        assert_eq!(header.version, 2);
        assert_eq!(Value::Object(decode_header(&header.value).unwrap()), payment);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = json!({"x402Version": 1, "payload": {"b": 1, "a": 2}, "zeta": true, "alpha": 0});
        let b = json!({"alpha": 0, "zeta": true, "payload": {"a": 2, "b": 1}, "x402Version": 1});
        assert_eq!(encode_payment(&a).unwrap(), encode_payment(&b).unwrap());
    }

    #[test]
    fn test_encode_rejects_invalid_payment() {
        assert_eq!(
            encode_payment(&json!({"x402Version": 1})).unwrap_err(),
            X402Error::MissingPayload
        );
    }

    #[test]
    fn test_decode_accepts_unpadded_base64() {
        let padded = encode(&json!({"ok": 1}));
        let unpadded = padded.trim_end_matches('=');
        assert_ne!(padded, unpadded);
        assert_eq!(decode_header(unpadded).unwrap()["ok"], 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_header("!!!"), Err(X402Error::Decode(_))));
        assert!(decode_header_value("!!!").is_none());
        assert!(decode_header_value("").is_none());
        // valid base64 of a JSON array
        assert!(decode_header_value(&STANDARD.encode("[1]")).is_none());
    }

    #[test]
    fn test_payment_required_header_wins() {
        let required = json!({
            "x402Version": 2,
            "resource": {"url": "https://api.example.com/weather"},
            "accepts": [{"scheme": "exact"}]
        });
        let map = headers(&[("payment-required", encode(&required))]);
        let decoded = decode_payment_required(&map, 402, b"{\"x402Version\":1,\"accepts\":[]}");
        assert_eq!(Value::Object(decoded.unwrap()), required);

        // header is honored even on non-402 statuses
        assert!(decode_payment_required(&map, 200, b"").is_some());
    }

    #[test]
    fn test_payment_required_v1_body() {
        let body = serde_json::to_vec(&json!({
            "x402Version": 1,
            "error": "X-PAYMENT header is required",
            "accepts": [{"scheme": "exact", "network": "base-sepolia"}]
        }))
        .unwrap();
        let decoded = decode_payment_required(&HeaderMap::new(), 402, &body).unwrap();
        assert_eq!(decoded["accepts"][0]["scheme"], "exact");
    }

    #[test]
    fn test_payment_required_body_rules() {
        let empty = HeaderMap::new();
        let v1 = serde_json::to_vec(&json!({"x402Version": 1, "accepts": []})).unwrap();

        // only 402 bodies count
        assert!(decode_payment_required(&empty, 400, &v1).is_none());
        assert!(decode_payment_required(&empty, 402, b"").is_none());
        assert!(decode_payment_required(&empty, 402, b"not json").is_none());

        // v2 bodies are not accepted without the header
        let v2 = serde_json::to_vec(&json!({
            "x402Version": 2,
            "resource": {"url": "https://x"},
            "accepts": []
        }))
        .unwrap();
        assert!(decode_payment_required(&empty, 402, &v2).is_none());

        let no_accepts = serde_json::to_vec(&json!({"x402Version": 1})).unwrap();
        assert!(decode_payment_required(&empty, 402, &no_accepts).is_none());

        let null_accepts = serde_json::to_vec(&json!({"x402Version": 1, "accepts": null})).unwrap();
        assert!(decode_payment_required(&empty, 402, &null_accepts).is_none());
    }

    #[test]
    fn test_payment_response_header_precedence() {
        let v2 = json!({"success": true, "transaction": "0xabc"});
        let v1 = json!({"success": true, "transaction": "0xold"});

        let both = headers(&[
            ("payment-response", encode(&v2)),
            ("x-payment-response", encode(&v1)),
        ]);
        assert_eq!(decode_payment_response(&both).unwrap()["transaction"], "0xabc");

        let legacy = headers(&[("x-payment-response", encode(&v1))]);
        assert_eq!(decode_payment_response(&legacy).unwrap()["transaction"], "0xold");

        assert!(decode_payment_response(&HeaderMap::new()).is_none());
    }
}
