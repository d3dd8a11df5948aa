//! x402 protocol version detection.
//!
//! A value's version is inferred from its shape first and from an explicit
//! `x402Version` field second. Each rule is a [`VersionDetector`]; the rules
//! are tried in a fixed priority order and the first match wins.

use serde_json::{Map, Value};

/// A single version-recognition rule.
pub trait VersionDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the detected version, or `None` when the rule does not apply.
    fn detect(&self, value: &Map<String, Value>) -> Option<u32>;
}

/// v2 payment payloads wrap the signature in an envelope echoing the
/// `resource` and the `accepted` requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentEnvelopeDetector;

impl VersionDetector for PaymentEnvelopeDetector {
    fn name(&self) -> &'static str {
        "payment-envelope"
    }

    fn detect(&self, value: &Map<String, Value>) -> Option<u32> {
        let has_accepted = value.get("accepted").is_some_and(Value::is_object);
        let has_resource = value.get("resource").is_some_and(Value::is_object);
        (has_accepted && has_resource).then_some(2)
    }
}

/// v2 payment-required responses describe the resource once at the top
/// level instead of inside every requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredEnvelopeDetector;

impl VersionDetector for RequiredEnvelopeDetector {
    fn name(&self) -> &'static str {
        "required-envelope"
    }

    fn detect(&self, value: &Map<String, Value>) -> Option<u32> {
        let has_resource = value.get("resource").is_some_and(Value::is_object);
        let has_accepts = value.get("accepts").is_some_and(Value::is_array);
        (has_resource && has_accepts).then_some(2)
    }
}

/// Falls back to the explicit `x402Version` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitVersionDetector;

impl VersionDetector for ExplicitVersionDetector {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn detect(&self, value: &Map<String, Value>) -> Option<u32> {
        value.get("x402Version").and_then(normalize_version)
    }
}

/// Interpret a JSON number as a protocol version.
///
/// Accepts integers and integral floats (`2.0`); versions start at 1.
pub fn normalize_version(value: &Value) -> Option<u32> {
    let version = match value.as_u64() {
        Some(v) => v,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(version).ok().filter(|v| *v >= 1)
}

/// Default detection order: structural rules before the explicit field.
static DEFAULT_DETECTORS: [&dyn VersionDetector; 3] = [
    &PaymentEnvelopeDetector,
    &RequiredEnvelopeDetector,
    &ExplicitVersionDetector,
];

/// Detect the protocol version of a JSON object using the default rules.
pub fn detect_version(value: &Map<String, Value>) -> Option<u32> {
    detect_with(&DEFAULT_DETECTORS, value)
}

/// Detect the protocol version using a caller-provided rule order.
pub fn detect_with(detectors: &[&dyn VersionDetector], value: &Map<String, Value>) -> Option<u32> {
    detectors.iter().find_map(|detector| {
        let version = detector.detect(value)?;
        tracing::trace!(detector = detector.name(), version, "x402 version detected");
        Some(version)
    })
}
