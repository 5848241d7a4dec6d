//! Apidoc Crypto - Signing primitives for the documentation gateway.
//!
//! This crate provides:
//! - Symmetric signing keys with secure memory handling
//! - HMAC-SHA2 signing algorithms (`HS256`, `HS384`, `HS512`)
//! - Per-issuance random nonces
//! - Unpadded base64url segment encoding
//!
//! # Example
//!
//! ```
//! use apidoc_crypto::{SigningAlgorithm, SigningKey};
//!
//! let key = SigningKey::from_secret("an-example-secret-of-reasonable-length").unwrap();
//! let signature = SigningAlgorithm::Hs512.sign(&key, b"header.payload").unwrap();
//!
//! assert!(SigningAlgorithm::Hs512.verify(&key, b"header.payload", &signature).is_ok());
//! assert!(SigningAlgorithm::Hs256.verify(&key, b"header.payload", &signature).is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod algorithm;
mod encoding;
mod error;
mod key;
mod nonce;

pub use algorithm::SigningAlgorithm;
pub use encoding::{decode_segment, encode_segment};
pub use error::{CryptoError, CryptoResult};
pub use key::SigningKey;
pub use nonce::{DEFAULT_NONCE_LENGTH, generate_nonce};
