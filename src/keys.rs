//! Secret key material.
//!
//! Secrets are plain symmetric HMAC keys. They are wrapped in `Zeroizing`
//! so they are cleared from memory when dropped, and never printed by
//! `Debug`.

use std::fmt;
use std::path::Path;

use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::MsgsealError;

/// Default length for generated secrets (256 bits).
pub const DEFAULT_SECRET_LEN: usize = 32;

/// A symmetric signing secret. Equality is checked in constant time.
#[derive(Clone)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Secret(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {}])", self.0.len())
    }
}

impl From<&[u8]> for Secret {
    fn from(bytes: &[u8]) -> Self {
        Secret::new(bytes)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(bytes: Vec<u8>) -> Self {
        Secret::new(bytes)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Secret::new(s.as_bytes())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Secret::new(s.into_bytes())
    }
}

/// Generate `len` bytes of secret material from the OS RNG.
pub fn generate_secret(len: usize) -> Secret {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Secret(bytes)
}

/// Read a secret from a file: raw bytes, or hex text when `hex_encoded`.
pub fn load_secret(path: impl AsRef<Path>, hex_encoded: bool) -> Result<Secret, MsgsealError> {
    let path = path.as_ref();
    let raw = Zeroizing::new(std::fs::read(path).map_err(|e| {
        MsgsealError::InvalidSecret(format!("cannot read {}: {e}", path.display()))
    })?);
    if hex_encoded {
        decode_hex_secret(&raw)
    } else {
        Ok(Secret(raw))
    }
}

/// Decode hex-encoded secret text, ignoring surrounding whitespace.
pub fn decode_hex_secret(text: &[u8]) -> Result<Secret, MsgsealError> {
    let text = std::str::from_utf8(text)
        .map_err(|_| MsgsealError::InvalidSecret("hex secret is not valid UTF-8".into()))?;
    let bytes = hex::decode(text.trim())
        .map_err(|e| MsgsealError::InvalidSecret(format!("invalid hex secret: {e}")))?;
    Ok(Secret::new(bytes))
}
