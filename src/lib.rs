//! Msgseal: tamper-evident signed messages.
//!
//! A value is wrapped in a small JSON envelope together with an optional
//! expiry and purpose, framed as base64 and signed with HMAC-SHA256. Tokens
//! can be verified against a primary secret and any number of rotated-out
//! secrets.
//!
//! The payload is encoded, not encrypted: anyone holding a token can read it.

pub mod error;
pub mod keys;
pub mod serialize;
pub mod sign;
pub mod types;
pub mod verifier;
pub mod verify;

pub use error::MsgsealError;
pub use keys::Secret;
pub use types::{ExpiryPolicy, VerifierOptions};
pub use verifier::Verifier;
