//! Test fixtures for tokens, users and documents.

use std::time::Duration;

use apidoc_capabilities::{Authorizer, GrantSet, TokenCodec, TokenSettings};
use apidoc_crypto::{SigningAlgorithm, SigningKey};
use apidoc_store::{BcryptVerifier, InMemoryStore, PasswordVerifier, USER_INDEX};
use serde_json::json;

/// HMAC secret used by every test codec.
pub const TEST_SECRET: &str = "apidoc-test-secret-0123456789abcdef";

/// Password of every seeded user that has one.
pub const TEST_PASSWORD: &str = "sekrit";

/// Token lifetime used by [`test_settings`].
pub const TEST_MAX_AGE: Duration = Duration::from_secs(3600);

/// Seeded user limited to `app1`.
pub const JIMMY: &str = "jimmy";
/// Seeded superuser.
pub const ROOT: &str = "root";
/// Seeded user awaiting activation.
pub const PENDING: &str = "pending";
/// Registration code of [`PENDING`].
pub const PENDING_CODE: &str = "Zx9kQ2mP7rT4vW1yB3nC5";
/// Seeded user with grants but no password hash.
pub const NO_HASH: &str = "nohash";

/// Scopes granted to [`JIMMY`].
pub const JIMMY_SCOPES: &[&str] = &[
    "read:apps",
    "read:app:app1",
    "read:app.docs:app1",
    "read:doc:guide",
    "read:doc.versions:guide",
    "read:doc.branches:guide",
    "read:doc:app1:guide",
];

/// Create the signing key for [`TEST_SECRET`].
#[must_use]
pub fn test_key() -> SigningKey {
    SigningKey::from_secret(TEST_SECRET).expect("test secret is a valid key")
}

/// HS512 settings with a one hour max age.
#[must_use]
pub fn test_settings() -> TokenSettings {
    TokenSettings::new(test_key(), SigningAlgorithm::Hs512, TEST_MAX_AGE)
}

/// A codec over [`test_settings`].
#[must_use]
pub fn test_codec() -> TokenCodec {
    TokenCodec::new(test_settings())
}

/// An authorizer over [`test_codec`].
#[must_use]
pub fn test_authorizer() -> Authorizer {
    Authorizer::new(test_codec())
}

/// A bcrypt verifier at the lowest cost, for fast tests.
#[must_use]
pub fn test_verifier() -> BcryptVerifier {
    BcryptVerifier::with_cost(BcryptVerifier::MIN_COST)
}

/// Hash a password with [`test_verifier`].
#[must_use]
pub fn test_password_hash(password: &str) -> String {
    test_verifier()
        .hash(password)
        .expect("bcrypt at minimum cost succeeds")
}

/// Grants of [`JIMMY`].
#[must_use]
pub fn jimmy_grants() -> GrantSet {
    GrantSet::from_scopes(JIMMY_SCOPES)
}

/// An in-memory store seeded with two apps, their docs, versions,
/// branches, OpenAPI documents, and the test users.
#[must_use]
pub fn seeded_store() -> InMemoryStore {
    let hash = test_password_hash(TEST_PASSWORD);

    InMemoryStore::new()
        .with_document("app", "app1", json!({"name": "App One", "owner": "docs-team"}))
        .with_document("app", "app2", json!({"name": "App Two", "owner": "platform"}))
        .with_document("doc", "app1.guide", json!({"app": "app1", "doc": "guide", "title": "User Guide"}))
        .with_document("doc", "app1.api", json!({"app": "app1", "doc": "api", "title": "API Reference"}))
        .with_document("doc", "app2.guide", json!({"app": "app2", "doc": "guide", "title": "Guide"}))
        .with_document("docversion", "app1.guide.1.0", json!({"app": "app1", "doc": "guide", "version": "1.0"}))
        .with_document("docversion", "app1.guide.2.0", json!({"app": "app1", "doc": "guide", "version": "2.0"}))
        .with_document("docversion", "app2.guide.1.0", json!({"app": "app2", "doc": "guide", "version": "1.0"}))
        .with_document("docbranch", "app1.guide.1.0.master", json!({"app": "app1", "doc": "guide", "version": "1.0", "branch": "master"}))
        .with_document("docbranch", "app1.guide.1.0.next", json!({"app": "app1", "doc": "guide", "version": "1.0", "branch": "next"}))
        .with_document("docbranch", "app1.guide.2.0.master", json!({"app": "app1", "doc": "guide", "version": "2.0", "branch": "master"}))
        .with_document("openapi", "app1.guide.1.0.master", json!({"openapi": "3.0.0", "info": {"title": "User Guide", "version": "1.0"}}))
        .with_document("openapi", "app1.guide.1.0.next", json!({"openapi": "3.0.0", "info": {"title": "User Guide", "version": "1.0-next"}}))
        .with_document(USER_INDEX, JIMMY, json!({
            "username": JIMMY,
            "email": "jimmy@example.com",
            "name": "Jimmy",
            "password_hash": hash,
            "acl": JIMMY_SCOPES,
        }))
        .with_document(USER_INDEX, ROOT, json!({
            "username": ROOT,
            "email": "root@example.com",
            "password_hash": hash,
            "acl": "superuser",
        }))
        .with_document(USER_INDEX, PENDING, json!({
            "username": PENDING,
            "email": "pending@example.com",
            "registration_code": PENDING_CODE,
        }))
        .with_document(USER_INDEX, NO_HASH, json!({
            "username": NO_HASH,
            "email": "nohash@example.com",
            "acl": ["read:apps"],
        }))
}

#[cfg(test)]
mod tests {
    use apidoc_store::{CredentialStore, DocumentCredentialStore, DocumentStore, SearchQuery};

    use super::*;

    #[tokio::test]
    async fn test_seeded_users_resolve() {
        let creds = DocumentCredentialStore::new(seeded_store().shared());
        let jimmy = creds.lookup_user(JIMMY).await.unwrap().unwrap();
        assert_eq!(jimmy.acl, jimmy_grants());
        assert!(test_verifier().verify(TEST_PASSWORD, jimmy.password_hash.as_deref().unwrap()));

        let root = creds.lookup_user(ROOT).await.unwrap().unwrap();
        assert!(root.acl.is_superuser());

        let pending = creds.find_by_email("pending@example.com").await.unwrap().unwrap();
        assert_eq!(pending.registration_code.as_deref(), Some(PENDING_CODE));
        assert!(pending.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_seeded_documents() {
        let store = seeded_store();
        assert_eq!(store.count("app").await.unwrap(), 2);
        let docs = store
            .search_uri("doc", &SearchQuery::all().term("app", "app1"))
            .await
            .unwrap();
        assert_eq!(docs.total, 2);
    }

    #[test]
    fn test_codec_round_trip() {
        let issued = test_codec().issue(JIMMY, jimmy_grants()).unwrap();
        let verified = test_codec().verify(&issued.token).unwrap();
        assert_eq!(verified.subject, JIMMY);
        assert_eq!(verified.grants, jimmy_grants());
    }
}
