//! Error types for x402 payment translation.

use thiserror::Error;

/// Result type for x402 operations.
pub type X402Result<T> = Result<T, X402Error>;

/// Errors that can occur while parsing or encoding x402 payment data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum X402Error {
    /// The payment metadata is not a JSON object.
    #[error("x402/payment metadata must be an object")]
    NotAnObject,

    /// The payment metadata has no (or a null) `payload` field.
    #[error("x402/payment metadata missing payload")]
    MissingPayload,

    /// A v2 credential is missing one of its mandatory envelope objects.
    #[error("x402/payment metadata missing {field} for v2 payment")]
    MissingEnvelopeField {
        /// Name of the missing field (`resource` or `accepted`).
        field: &'static str,
    },

    /// The protocol version could be determined neither from the shape of
    /// the value nor from an explicit `x402Version` field.
    #[error("unable to determine x402 version")]
    UnknownVersion,

    /// The credential could not be serialized to JSON.
    #[error("unable to encode x402 payment payload: {0}")]
    Encode(String),

    /// A header value could not be decoded (bad base64 or bad JSON).
    #[error("unable to decode x402 header: {0}")]
    Decode(String),
}

impl X402Error {
    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::NotAnObject => "Pass the payment as a JSON object under _meta[\"x402/payment\"]",
            Self::MissingPayload => "Include the signed authorization under the `payload` field",
            Self::MissingEnvelopeField { .. } => {
                "x402 v2 payments must echo both `resource` and `accepted` from the requirements"
            }
            Self::UnknownVersion => "Set `x402Version` to 1 or 2 on the payment object",
            Self::Encode(_) => "Check that the payment object is valid JSON",
            Self::Decode(_) => "The upstream header is not base64-encoded JSON",
        }
    }

    /// Returns true if this error was caused by malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotAnObject | Self::MissingPayload | Self::MissingEnvelopeField { .. }
        )
    }
}

impl From<serde_json::Error> for X402Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}
