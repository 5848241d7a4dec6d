//! Apidoc Test - Shared test utilities for the apidoc gateway.
//!
//! This crate provides fixtures, seeded stores and failing collaborators
//! that can be used across apidoc crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! apidoc-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use apidoc_test::{JIMMY, seeded_store, test_codec};
//!
//!     #[tokio::test]
//!     async fn test_seeded_user() {
//!         let token = test_codec().issue(JIMMY, Default::default()).unwrap();
//!         assert!(test_codec().verify(&token.token).is_ok());
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
