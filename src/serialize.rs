//! Token framing.
//!
//! A token is the padded standard-base64 encoding of the JSON record,
//! followed by `--` and the 64-character lowercase hex digest:
//!
//!   base64(JSON(record)) "--" hex(HMAC-SHA256(secret, base64(JSON(record))))
//!
//! The base64 alphabet contains no `-`, but the digest is still located
//! by its fixed length from the end of the token, never by searching for
//! the separator.

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MsgsealError;
use crate::types::*;

/// A token split into its framed payload and hex digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedToken<'a> {
    pub payload: &'a str,
    pub digest: &'a str,
}

/// Compact JSON formatter that additionally escapes `<`, `>`, `&`, U+2028
/// and U+2029 as `\u003c`, `\u003e`, `\u0026`, `\u2028` and `\u2029`.
///
/// Tokens signed by other implementations sharing a secret are produced with
/// these escapes, and the digest covers the exact bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingFormatter;

impl serde_json::ser::Formatter for EscapingFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escape = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment.get(start..i).unwrap_or_default().as_bytes())?;
            writer.write_all(escape.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment.get(start..).unwrap_or_default().as_bytes())
    }
}

/// Serialize a record to JSON bytes.
pub fn serialize_record<T: Serialize>(record: &Record<T>) -> Result<Vec<u8>, MsgsealError> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, EscapingFormatter);
    record
        .serialize(&mut serializer)
        .map_err(MsgsealError::Serialization)?;
    Ok(buf)
}

/// Parse JSON bytes as a record.
pub fn deserialize_record<T: DeserializeOwned>(data: &[u8]) -> Result<Record<T>, MsgsealError> {
    serde_json::from_slice(data)
        .map_err(|e| MsgsealError::MalformedToken(format!("invalid record: {e}")))
}

/// Frame serialized bytes as padded standard base64.
pub fn encode_payload(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Undo [`encode_payload`].
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, MsgsealError> {
    STANDARD
        .decode(payload)
        .map_err(|e| MsgsealError::MalformedToken(format!("invalid base64 payload: {e}")))
}

/// Assemble a token from a framed payload and its hex digest.
pub fn join_token(payload: &str, digest: &str) -> String {
    let mut token = String::with_capacity(payload.len() + SEPARATOR_LEN + digest.len());
    token.push_str(payload);
    token.push_str(SEPARATOR);
    token.push_str(digest);
    token
}

/// Split a token into payload and digest using the fixed digest length.
pub fn split_token(token: &str) -> Result<SignedToken<'_>, MsgsealError> {
    if token.len() < MIN_TOKEN_LEN {
        return Err(MsgsealError::MalformedToken(format!(
            "token too short: expected at least {MIN_TOKEN_LEN} bytes, got {}",
            token.len()
        )));
    }

    let digest_start = token.len() - DIGEST_HEX_LEN;
    let payload_end = digest_start - SEPARATOR_LEN;

    let (Some(payload), Some(separator), Some(digest)) = (
        token.get(..payload_end),
        token.get(payload_end..digest_start),
        token.get(digest_start..),
    ) else {
        return Err(MsgsealError::MalformedToken(
            "digest boundary splits a character".into(),
        ));
    };

    if separator != SEPARATOR {
        return Err(MsgsealError::MalformedToken(format!(
            "expected separator {SEPARATOR:?} before digest, found {separator:?}"
        )));
    }

    Ok(SignedToken { payload, digest })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const DIGEST: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_split_token() {
        let token = join_token("aGVsbG8=", DIGEST);
        let parts = split_token(&token).unwrap();
        assert_eq!(parts.payload, "aGVsbG8=");
        assert_eq!(parts.digest, DIGEST);
    }

    #[test]
    fn test_split_empty_payload() {
        let token = join_token("", DIGEST);
        let parts = split_token(&token).unwrap();
        assert_eq!(parts.payload, "");
        assert_eq!(parts.digest, DIGEST);
    }

    #[test]
    fn test_split_uses_fixed_length_not_separator() {
        // A separator inside the payload must not move the boundary.
        let token = join_token("ab--cd--", DIGEST);
        let parts = split_token(&token).unwrap();
        assert_eq!(parts.payload, "ab--cd--");
        assert_eq!(parts.digest, DIGEST);
    }

    #[test]
    fn test_split_too_short() {
        let token = join_token("", DIGEST);
        let result = split_token(&token[1..]);
        assert!(matches!(result, Err(MsgsealError::MalformedToken(_))));
        assert!(matches!(split_token(""), Err(MsgsealError::MalformedToken(_))));
    }

    #[test]
    fn test_split_bad_separator() {
        let token = format!("aGVsbG8=-+{DIGEST}");
        let result = split_token(&token);
        assert!(matches!(result, Err(MsgsealError::MalformedToken(_))));
    }

    #[test]
    fn test_split_non_ascii_boundary() {
        // 'é' is two bytes; place it across the separator/digest boundary.
        let mut token = String::from("aGVsbG8=-");
        token.push('é');
        token.push_str(&DIGEST[1..]);
        let result = split_token(&token);
        assert!(matches!(result, Err(MsgsealError::MalformedToken(_))));
    }

    #[test]
    fn test_payload_framing() {
        let encoded = encode_payload(br#"{"Message":"hello"}"#);
        assert_eq!(encoded, "eyJNZXNzYWdlIjoiaGVsbG8ifQ==");
        assert_eq!(decode_payload(&encoded).unwrap(), br#"{"Message":"hello"}"#);
    }

    #[test]
    fn test_decode_rejects_url_safe_alphabet() {
        let result = decode_payload("ab-_");
        assert!(matches!(result, Err(MsgsealError::MalformedToken(_))));
    }

    #[test]
    fn test_serialize_record_escapes_html_and_line_separators() {
        let record = Record::new("<a&b>\u{2028}\u{2029}\"x\"", None, Some("<p>"));
        let json = String::from_utf8(serialize_record(&record).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"Message":"\u003ca\u0026b\u003e\u2028\u2029\"x\"","ExpiresAt":"","Purpose":"\u003cp\u003e"}"#
        );
        let back: Record<String> = deserialize_record(json.as_bytes()).unwrap();
        assert_eq!(back.message, "<a&b>\u{2028}\u{2029}\"x\"");
        assert_eq!(back.purpose.as_deref(), Some("<p>"));
    }

    #[test]
    fn test_serialize_record_escapes_map_keys() {
        let record = Record::new(serde_json::json!({ "a&b": 1 }), None, None);
        let json = String::from_utf8(serialize_record(&record).unwrap()).unwrap();
        assert!(json.starts_with(r#"{"Message":{"a\u0026b":1}"#), "{json}");
    }

    #[test]
    fn test_deserialize_record_rejects_garbage() {
        let result = deserialize_record::<serde_json::Value>(b"not json");
        assert!(matches!(result, Err(MsgsealError::MalformedToken(_))));
    }

    #[test]
    fn test_serialize_record_reports_unserializable_value() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(vec![1u8, 2], "non-string key");
        let result = serialize_record(&Record::new(map, None, None));
        assert!(matches!(result, Err(MsgsealError::Serialization(_))));
    }
}
