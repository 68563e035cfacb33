//! The `Verifier`: a primary secret plus an append-only list of rotated
//! secrets.
//!
//! `Verifier` is `Send + Sync`. Generation only reads the primary secret;
//! verification takes a read lock on the rotation list; [`Verifier::rotate`]
//! takes the write lock, so rotating while other threads verify is safe.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MsgsealError;
use crate::keys::Secret;
use crate::serialize::{decode_payload, deserialize_record, split_token, SignedToken};
use crate::sign::sign_record;
use crate::types::{Record, VerifierOptions};
use crate::verify::{check_expiry, check_purpose, find_signing_secret};

/// Signs values into tokens and verifies tokens back into values.
#[derive(Debug)]
pub struct Verifier {
    primary: Secret,
    rotations: RwLock<Vec<Secret>>,
    options: VerifierOptions,
}

impl Verifier {
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self::with_options(secret, VerifierOptions::default())
    }

    pub fn with_options(secret: impl Into<Secret>, options: VerifierOptions) -> Self {
        Verifier {
            primary: secret.into(),
            rotations: RwLock::new(Vec::new()),
            options,
        }
    }

    pub fn options(&self) -> VerifierOptions {
        self.options
    }

    /// Sign `value` with the primary secret.
    ///
    /// An empty `purpose` is the same as `None`. Fails only if `value`
    /// cannot be serialized to JSON.
    pub fn generate<T: Serialize + ?Sized>(
        &self,
        value: &T,
        expires_at: Option<DateTime<Utc>>,
        purpose: Option<&str>,
    ) -> Result<String, MsgsealError> {
        let record = Record::new(value, expires_at, purpose);
        sign_record(self.primary.as_bytes(), &record)
    }

    /// Verify `token` against the current wall-clock time and return its
    /// value.
    ///
    /// Decode into `serde_json::Value` to get the payload back without
    /// knowing its concrete type.
    pub fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        expected_purpose: Option<&str>,
    ) -> Result<T, MsgsealError> {
        self.verify_at(token, expected_purpose, Utc::now())
    }

    /// Like [`Verifier::verify`], with an explicit verification time.
    pub fn verify_at<T: DeserializeOwned>(
        &self,
        token: &str,
        expected_purpose: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<T, MsgsealError> {
        let signed = split_token(token)?;
        self.authenticate(&signed)?;

        let data = decode_payload(signed.payload)?;
        let record: Record<T> = deserialize_record(&data)?;

        let claims = check_purpose(record.purpose.as_deref(), expected_purpose).and_then(|()| {
            check_expiry(record.expires_at.as_deref(), now, self.options.expiry_policy)
        });
        if let Err(e) = claims {
            tracing::debug!(error = %e, "token rejected");
            return Err(e);
        }

        Ok(record.message)
    }

    /// Keep accepting tokens signed with `secret`.
    ///
    /// Rotation secrets are tried after the primary, in the order they were
    /// added. There is no way to remove one.
    pub fn rotate(&self, secret: impl Into<Secret>) {
        let mut rotations = self
            .rotations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        rotations.push(secret.into());
        tracing::debug!(rotations = rotations.len(), "added rotation secret");
    }

    pub fn rotation_count(&self) -> usize {
        self.rotations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn authenticate(&self, signed: &SignedToken<'_>) -> Result<(), MsgsealError> {
        let rotations = self.rotations.read().unwrap_or_else(PoisonError::into_inner);
        let secrets = std::iter::once(self.primary.as_bytes())
            .chain(rotations.iter().map(Secret::as_bytes));

        match find_signing_secret(secrets, signed) {
            Some(0) => Ok(()),
            Some(i) => {
                tracing::debug!(rotation = i - 1, "token authenticated by rotation secret");
                Ok(())
            }
            None => {
                tracing::debug!(
                    candidates = rotations.len() + 1,
                    "token digest matched no secret"
                );
                Err(MsgsealError::InvalidSignature)
            }
        }
    }
}
