//! Token signing: HMAC-SHA256 over the framed payload.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::MsgsealError;
use crate::serialize::{encode_payload, join_token, serialize_record};
use crate::types::Record;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 digest of `payload` under `secret`.
#[must_use]
pub fn compute_digest(secret: &[u8], payload: &str) -> String {
    #[allow(clippy::expect_used)] // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is unbounded");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Serialize, frame and sign a record, returning the token string.
pub fn sign_record<T: Serialize>(secret: &[u8], record: &Record<T>) -> Result<String, MsgsealError> {
    let payload = encode_payload(&serialize_record(record)?);
    let digest = compute_digest(secret, &payload);
    Ok(join_token(&payload, &digest))
}
