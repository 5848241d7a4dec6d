//! Prelude module - commonly used types for convenient import.
//!
//! Use `use apidoc_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys and algorithms
pub use crate::{SigningAlgorithm, SigningKey};

// Helpers
pub use crate::{decode_segment, encode_segment, generate_nonce};
