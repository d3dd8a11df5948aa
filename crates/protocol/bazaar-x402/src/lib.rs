//! x402 protocol types and header codec for the Bazaar bridge.
//!
//! [x402](https://www.x402.org/) lets an HTTP server demand payment by
//! answering `402 Payment Required`; the client retries with a signed
//! payment in a request header. This crate holds the pieces of that
//! exchange the bridge needs on the client side:
//!
//! ```text
//! ┌─────────────┐  GET + X-PAYMENT / PAYMENT-SIGNATURE  ┌──────────────┐
//! │  Bridge     │ ─────────────────────────────────────→│  x402        │
//! │  (client)   │ ←──────────────────────────────────── │  resource    │
//! │             │  402 + PAYMENT-REQUIRED               │  server      │
//! │             │  or 200 + PAYMENT-RESPONSE            │              │
//! └─────────────┘                                       └──────────────┘
//! ```
//!
//! # Components
//!
//! - **[`types`]**: discovery listing items and payment requirements
//! - **[`version`]**: protocol version detection (v1 vs v2)
//! - **[`credential`]**: validated caller payment credentials
//! - **[`codec`]**: base64 JSON header encoding and decoding
//! - **[`error`]**: error types with recovery suggestions
//!
//! # Usage
//!
//! ```rust
//! use bazaar_x402::encode_payment;
//! use serde_json::json;
//!
//! let payment = json!({
//!     "x402Version": 2,
//!     "resource": {"url": "https://api.example.com/weather"},
//!     "accepted": {"scheme": "exact", "network": "eip155:84532"},
//!     "payload": {"signature": "0xdeadbeef"}
//! });
//! let header = encode_payment(&payment).unwrap();
//! assert_eq!(header.name, "PAYMENT-SIGNATURE");
//! ```

pub mod codec;
pub mod credential;
pub mod error;
pub mod types;
pub mod version;

// Re-export main types
pub use codec::{
    decode_header, decode_header_value, decode_payment_required, decode_payment_response,
    encode_credential, encode_payment, payment_header_name, PaymentHeader,
    STATUS_PAYMENT_REQUIRED,
};
pub use credential::{CredentialV1, CredentialV2, PaymentCredential};
pub use error::{X402Error, X402Result};
pub use types::{
    DiscoveryResource, InputDescriptor, PaymentRequirement, HEADER_PAYMENT_REQUIRED,
    HEADER_PAYMENT_RESPONSE, HEADER_PAYMENT_SIGNATURE, HEADER_X_PAYMENT,
    HEADER_X_PAYMENT_RESPONSE, META_CALL_WITH, META_PAYMENT, META_PAYMENT_REQUIRED,
    META_PAYMENT_RESPONSE, RESOURCE_TYPE_HTTP, X402_VERSION,
};
pub use version::{detect_version, normalize_version, VersionDetector};
