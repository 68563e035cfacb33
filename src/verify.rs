//! Token verification: digest authentication and claim checks.

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use crate::error::MsgsealError;
use crate::serialize::SignedToken;
use crate::sign::compute_digest;
use crate::types::{format_timestamp, ExpiryPolicy};

/// Recompute the digest of `payload` under `secret` and compare it with
/// `digest` in constant time.
#[must_use]
pub fn digest_matches(secret: &[u8], payload: &str, digest: &str) -> bool {
    let expected = compute_digest(secret, payload);
    expected.as_bytes().ct_eq(digest.as_bytes()).into()
}

/// Return the index of the first secret that authenticates `token`.
///
/// Every candidate is compared in constant time; iteration stops at the
/// first match.
pub fn find_signing_secret<'a, I>(secrets: I, token: &SignedToken<'_>) -> Option<usize>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    secrets
        .into_iter()
        .position(|secret| digest_matches(secret, token.payload, token.digest))
}

/// Check the record's purpose against the caller's expectation.
///
/// `None` and `Some("")` both mean the caller expects no purpose. A record
/// without a purpose passes regardless of `expected`.
pub fn check_purpose(purpose: Option<&str>, expected: Option<&str>) -> Result<(), MsgsealError> {
    let Some(actual) = purpose else {
        return Ok(());
    };
    let expected = expected.unwrap_or("");
    if actual != expected {
        return Err(MsgsealError::PurposeMismatch {
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        });
    }
    Ok(())
}

/// Check the record's expiry against `now`.
///
/// A token expiring exactly at `now` is still valid.
pub fn check_expiry(
    expires_at: Option<&str>,
    now: DateTime<Utc>,
    policy: ExpiryPolicy,
) -> Result<(), MsgsealError> {
    let Some(raw) = expires_at else {
        return Ok(());
    };

    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(e) => match policy {
            ExpiryPolicy::Lenient => {
                tracing::warn!(expires_at = raw, error = %e, "ignoring unparsable expiry timestamp");
                return Ok(());
            }
            ExpiryPolicy::Strict => {
                return Err(MsgsealError::MalformedToken(format!(
                    "invalid expiry timestamp {raw:?}: {e}"
                )));
            }
        },
    };

    if parsed < now {
        return Err(MsgsealError::Expired {
            expired_at: raw.to_owned(),
            now: format_timestamp(now),
        });
    }
    Ok(())
}
