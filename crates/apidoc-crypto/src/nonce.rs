//! Per-issuance random nonces.

use rand::Rng;
use rand::rngs::OsRng;

/// Nonce length used when none is configured.
pub const DEFAULT_NONCE_LENGTH: usize = 10;

/// URL-safe alphabet (64 symbols, one per 6 bits of entropy).
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a random URL-safe nonce of `length` characters from the OS RNG.
#[must_use]
pub fn generate_nonce(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
