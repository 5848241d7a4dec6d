//! HMAC-SHA2 signing algorithms.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{CryptoError, CryptoResult};
use crate::key::SigningKey;

/// Symmetric signing algorithm, named as in a token header's `alg` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC with SHA-384.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC with SHA-512.
    #[default]
    #[serde(rename = "HS512")]
    Hs512,
}

impl SigningAlgorithm {
    /// Header name of the algorithm.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    /// Compute the MAC of `message`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the MAC rejects the key.
    pub fn sign(self, key: &SigningKey, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let tag = match self {
            Self::Hs256 => mac::<Hmac<Sha256>>(key, message)?,
            Self::Hs384 => mac::<Hmac<Sha384>>(key, message)?,
            Self::Hs512 => mac::<Hmac<Sha512>>(key, message)?,
        };
        Ok(tag)
    }

    /// Verify a MAC in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SignatureVerificationFailed`] if the tag does not
    /// match, or [`CryptoError::InvalidKeyLength`] if the MAC rejects the key.
    pub fn verify(self, key: &SigningKey, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
        match self {
            Self::Hs256 => verify_mac::<Hmac<Sha256>>(key, message, signature),
            Self::Hs384 => verify_mac::<Hmac<Sha384>>(key, message, signature),
            Self::Hs512 => verify_mac::<Hmac<Sha512>>(key, message, signature),
        }
    }
}

fn keyed<M: Mac + hmac::digest::KeyInit>(key: &SigningKey) -> CryptoResult<M> {
    <M as Mac>::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::InvalidKeyLength(e.to_string()))
}

fn mac<M: Mac + hmac::digest::KeyInit>(key: &SigningKey, message: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut m = keyed::<M>(key)?;
    m.update(message);
    Ok(m.finalize().into_bytes().to_vec())
}

fn verify_mac<M: Mac + hmac::digest::KeyInit>(
    key: &SigningKey,
    message: &[u8],
    signature: &[u8],
) -> CryptoResult<()> {
    let mut m = keyed::<M>(key)?;
    m.update(message);
    m.verify_slice(signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SigningAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}
