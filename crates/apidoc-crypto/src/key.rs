//! Symmetric signing keys with secure memory handling.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// A symmetric HMAC signing key.
///
/// The secret bytes are zeroized on drop and never appear in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    /// Create a key from secret material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if the secret is empty.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Raw secret bytes (careful - sensitive!).
    #[must_use]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.secret
    }

    /// Length of the secret in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secret.len()
    }

    /// Always `false`; an empty key cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    /// Get a short key ID (first 8 bytes of the SHA-256 of the secret).
    ///
    /// Useful for identifying keys in logs without exposing the secret.
    #[must_use]
    pub fn key_id(&self) -> [u8; 8] {
        let digest = Sha256::digest(&self.secret);
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        id
    }

    /// Get the key ID as a hex string.
    #[must_use]
    pub fn key_id_hex(&self) -> String {
        hex::encode(self.key_id())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SigningKey::from_secret(""),
            Err(CryptoError::EmptySecret)
        ));
    }

    #[test]
    fn test_key_id_is_stable() {
        let a = SigningKey::from_secret("secret-one").unwrap();
        let b = SigningKey::from_secret("secret-one").unwrap();
        let c = SigningKey::from_secret("secret-two").unwrap();

        assert_eq!(a.key_id(), b.key_id());
        assert_ne!(a.key_id(), c.key_id());
        assert_eq!(a.key_id_hex().len(), 16);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key = SigningKey::from_secret("do-not-print-me").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("do-not-print-me"));
        assert!(debug.contains("key_id"));
    }
}
