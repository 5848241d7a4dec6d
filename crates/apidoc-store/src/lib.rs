//! Apidoc Store - Document and credential storage for the gateway.
//!
//! This crate provides:
//! - [`DocumentStore`], an async JSON document store organised in indices
//! - [`ElasticsearchStore`], talking to the Elasticsearch REST API
//! - [`InMemoryStore`] for tests and local development
//! - [`SearchQuery`] rendering Lucene URI searches and [`DocId`] parsing
//! - [`CredentialStore`] and [`UserRecord`] for login and registration
//! - [`PasswordVerifier`] with a bcrypt implementation
//!
//! # Example
//!
//! ```
//! use apidoc_store::{QueryMode, SearchQuery};
//!
//! let query = SearchQuery::new(QueryMode::And)
//!     .term("app", "app1")
//!     .term("doc", "guide");
//! assert_eq!(query.render().as_deref(), Some("(app:app1)AND(doc:guide)"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod credentials;
mod document;
mod elasticsearch;
mod error;
mod memory;
mod password;
mod query;

pub use credentials::{CredentialStore, DocumentCredentialStore, USER_INDEX, UserRecord};
pub use document::{DocumentStore, Hit, SearchHits};
pub use elasticsearch::{ElasticsearchConfig, ElasticsearchStore};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use password::{BcryptVerifier, PasswordVerifier};
pub use query::{DocId, QueryMode, SearchQuery};
