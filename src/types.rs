use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Separator between the framed payload and the digest.
pub const SEPARATOR: &str = "--";

/// Separator length in bytes.
pub const SEPARATOR_LEN: usize = SEPARATOR.len();

/// HMAC-SHA256 digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hex-encoded digest length.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Shortest string that can possibly be a token (empty payload).
pub const MIN_TOKEN_LEN: usize = SEPARATOR_LEN + DIGEST_HEX_LEN;

/// The envelope that gets serialized and signed.
///
/// Field names and order are part of the wire format. Absent optional
/// fields are written as `""`; on decode a missing key, `null` and `""`
/// all read back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<T> {
    #[serde(rename = "Message")]
    pub message: T,

    #[serde(rename = "ExpiresAt", default, with = "empty_as_none")]
    pub expires_at: Option<String>,

    #[serde(rename = "Purpose", default, with = "empty_as_none")]
    pub purpose: Option<String>,
}

impl<T> Record<T> {
    /// Build a record. An empty purpose means no purpose restriction.
    pub fn new(message: T, expires_at: Option<DateTime<Utc>>, purpose: Option<&str>) -> Self {
        Record {
            message,
            expires_at: expires_at.map(format_timestamp),
            purpose: purpose.filter(|p| !p.is_empty()).map(str::to_owned),
        }
    }
}

/// Format an instant as RFC 3339 in UTC with second precision, e.g.
/// `2030-01-01T00:00:00Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// What to do with an `ExpiresAt` claim that is not a valid RFC 3339
/// timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Treat the token as non-expiring. Compatible with existing tokens.
    #[default]
    Lenient,
    /// Reject the token as malformed.
    Strict,
}

/// Verifier configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifierOptions {
    pub expiry_policy: ExpiryPolicy,
}

impl VerifierOptions {
    pub fn strict() -> Self {
        VerifierOptions {
            expiry_policy: ExpiryPolicy::Strict,
        }
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_field_names_and_order() {
        let record = Record::new("hello", None, None);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Message":"hello","ExpiresAt":"","Purpose":""}"#);
    }

    #[test]
    fn test_record_with_claims() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let record = Record::new(42, Some(at), Some("login"));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Message":42,"ExpiresAt":"2030-01-01T00:00:00Z","Purpose":"login"}"#
        );
    }

    #[test]
    fn test_empty_purpose_is_absent() {
        let record = Record::new((), None, Some(""));
        assert_eq!(record.purpose, None);
    }

    #[test]
    fn test_absent_fields_decode_as_none() {
        for json in [
            r#"{"Message":"x"}"#,
            r#"{"Message":"x","ExpiresAt":null,"Purpose":null}"#,
            r#"{"Message":"x","ExpiresAt":"","Purpose":""}"#,
        ] {
            let record: Record<String> = serde_json::from_str(json).unwrap();
            assert_eq!(record.expires_at, None, "{json}");
            assert_eq!(record.purpose, None, "{json}");
        }
    }

    #[test]
    fn test_format_timestamp_truncates_subseconds() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(format_timestamp(at), "2023-11-14T22:13:20Z");
    }
}
