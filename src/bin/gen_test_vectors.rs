//! Generates test vectors for msgseal wire format regression testing.
//! Run with: cargo run --bin gen_test_vectors > testdata/vectors.json

use chrono::{DateTime, Utc};

use msgseal::serialize::serialize_record;
use msgseal::types::Record;
use msgseal::Verifier;

struct Input {
    name: &'static str,
    secret: Vec<u8>,
    value: serde_json::Value,
    expires_at: Option<&'static str>,
    purpose: Option<&'static str>,
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let inputs = vec![
        Input {
            name: "string_no_claims",
            secret: b"secret".to_vec(),
            value: serde_json::json!("hello"),
            expires_at: None,
            purpose: None,
        },
        Input {
            name: "object_with_purpose",
            secret: b"secret".to_vec(),
            value: serde_json::json!({ "Greeting": "hello" }),
            expires_at: None,
            purpose: Some("login"),
        },
        Input {
            name: "array_far_future_expiry",
            secret: b"secret".to_vec(),
            value: serde_json::json!([1, 2, 3]),
            expires_at: Some("2099-01-01T00:00:00Z"),
            purpose: Some("unsubscribe"),
        },
        Input {
            name: "expired",
            secret: b"secret".to_vec(),
            value: serde_json::json!("stale"),
            expires_at: Some("2001-01-01T00:00:00Z"),
            purpose: None,
        },
        Input {
            name: "binary_secret",
            secret: (0u8..32).collect(),
            value: serde_json::json!({ "user_id": 42, "admin": false }),
            expires_at: Some("2040-06-15T08:30:00Z"),
            purpose: Some("session"),
        },
        Input {
            name: "unicode_value",
            secret: b"secret".to_vec(),
            value: serde_json::json!("héllo wörld ✓"),
            expires_at: None,
            purpose: None,
        },
        Input {
            name: "html_escaped_value",
            secret: b"secret".to_vec(),
            value: serde_json::json!("<a&b> \u{2028} x"),
            expires_at: None,
            purpose: Some("<form>"),
        },
    ];

    let mut vectors: Vec<serde_json::Value> = Vec::new();
    for input in inputs {
        let expires_at = input.expires_at.map(parse_time).transpose()?;
        let record = Record::new(&input.value, expires_at, input.purpose);
        let record_json = String::from_utf8(serialize_record(&record)?)?;

        let verifier = Verifier::new(input.secret.clone());
        let token = verifier.generate(&input.value, expires_at, input.purpose)?;

        vectors.push(serde_json::json!({
            "name": input.name,
            "secret_hex": hex::encode(&input.secret),
            "value": input.value,
            "expires_at": input.expires_at,
            "purpose": input.purpose,
            "expected_record_json": record_json,
            "expected_token": token,
        }));
    }

    let output = serde_json::json!({
        "description": "msgseal token vectors. Tokens are deterministic: HMAC-SHA256 over padded standard base64 of the JSON record.",
        "vectors": vectors,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
