use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsgsealError {
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("purpose mismatch: expected {expected:?}, token is bound to {actual:?}")]
    PurposeMismatch { expected: String, actual: String },

    #[error("token expired: expired at {expired_at}, current time is {now}")]
    Expired { expired_at: String, now: String },

    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}
