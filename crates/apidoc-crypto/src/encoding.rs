//! Unpadded base64url segment encoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{CryptoError, CryptoResult};

/// Encode bytes as an unpadded base64url segment.
#[must_use]
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode an unpadded base64url segment.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBase64Encoding`] on padding, foreign
/// alphabet characters, or a truncated final quantum.
pub fn decode_segment(segment: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| CryptoError::InvalidBase64Encoding)
}
