//! Prelude module - commonly used types for convenient import.
//!
//! Use `use apidoc_store::prelude::*;` to import all essential types.

// Errors
pub use crate::{StoreError, StoreResult};

// Documents
pub use crate::{DocId, DocumentStore, ElasticsearchStore, InMemoryStore, QueryMode, SearchQuery};

// Users
pub use crate::{BcryptVerifier, CredentialStore, PasswordVerifier, UserRecord};
