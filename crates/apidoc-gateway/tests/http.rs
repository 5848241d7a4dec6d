//! End-to-end tests driving the router in-process.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use apidoc_capabilities::{GrantSet, TokenCodec, TokenSettings};
use apidoc_crypto::{SigningAlgorithm, SigningKey};
use apidoc_gateway::{AppState, build_router};
use apidoc_test::{
    FailingCredentialStore, FailingDocumentStore, JIMMY, NO_HASH, PENDING, PENDING_CODE, ROOT,
    StalledCredentialStore, TEST_PASSWORD, init_test_logging, jimmy_grants, seeded_store,
    test_authorizer, test_codec, test_verifier,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn state() -> AppState {
    init_test_logging();
    AppState::new(test_authorizer(), seeded_store().shared())
        .with_passwords(Arc::new(test_verifier()))
        .with_store_timeout(Duration::from_secs(2))
}

fn app_with(state: AppState) -> Router {
    build_router(state, "*").unwrap()
}

fn app() -> Router {
    app_with(state())
}

fn now() -> i64 {
    i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()).unwrap()
}

fn issue_token(user: &str, grants: GrantSet) -> String {
    test_codec().issue(user, grants).unwrap().token
}

fn root_token() -> String {
    issue_token(ROOT, GrantSet::Superuser)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(path: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    post_raw(path, body.to_string(), token)
}

fn post_raw(path: &str, body: impl Into<Body>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.into()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post("/login", &json!({"username": username, "password": password}), None),
    )
    .await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_is_public() {
    let (status, body) = send(&app(), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_login_then_parameterized_access() {
    let app = app();
    let (status, body) = login(&app, JIMMY, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ttl"], 3600);
    let token = body["token"].as_str().unwrap().to_owned();

    let verified = test_codec().verify(&token).unwrap();
    assert_eq!(verified.subject, JIMMY);
    assert_eq!(verified.grants, jimmy_grants());

    let (status, body) = send(&app, get("/apps/app1", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "App One");

    let (status, body) = send(&app, get("/apps/app2", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_scope_mismatch");
}

#[tokio::test]
async fn test_login_rejections_look_identical() {
    let app = app();
    for (username, password) in [(JIMMY, "wrong"), ("nobody", TEST_PASSWORD), (NO_HASH, TEST_PASSWORD)] {
        let (status, body) = login(&app, username, password).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{username}");
        assert_eq!(
            body,
            json!({"error": "invalid_credentials", "message": "Invalid username and password"})
        );
    }
}

#[tokio::test]
async fn test_login_validation() {
    let app = app();

    let (status, body) = send(&app, post_raw("/login", "", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["keyword"], "required");
    assert_eq!(errors[0]["params"]["missingProperty"], "username");
    assert_eq!(errors[1]["params"]["missingProperty"], "password");

    let (status, body) = send(&app, post("/login", &json!({"username": JIMMY, "password": 42}), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["keyword"], "type");

    let (status, body) = send(&app, post("/login", &json!([JIMMY, TEST_PASSWORD]), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "request_body_malformed");

    let (status, _) = send(&app, post_raw("/login", "{\"username\":", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_store_outage_is_503() {
    let state = state().with_credentials(Arc::new(FailingCredentialStore::new()));
    let (status, body) = login(&app_with(state), JIMMY, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
    assert!(!body.to_string().contains("refused"));
}

#[tokio::test(start_paused = true)]
async fn test_login_store_timeout_is_503() {
    let state = state()
        .with_credentials(Arc::new(StalledCredentialStore::new(Duration::from_secs(60))))
        .with_store_timeout(Duration::from_secs(1));
    let (status, body) = login(&app_with(state), JIMMY, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

// ---------------------------------------------------------------------------
// Token rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_and_malformed_authorization() {
    let app = app();

    let (status, body) = send(&app, get("/apps", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization_missing");

    let request = Request::builder()
        .uri("/apps")
        .header(header::AUTHORIZATION, "Bearer abc.def")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization_malformed");

    let request = Request::builder()
        .uri("/apps")
        .header(header::AUTHORIZATION, format!("Token {}", root_token()))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_signature_is_403() {
    let foreign = TokenCodec::new(TokenSettings::new(
        SigningKey::from_secret("a-completely-different-secret-value").unwrap(),
        SigningAlgorithm::Hs512,
        Duration::from_secs(3600),
    ));
    let token = foreign.issue(ROOT, GrantSet::Superuser).unwrap().token;
    let (status, body) = send(&app(), get("/apps", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_expired_foreign_algorithm_is_403() {
    let foreign = TokenCodec::new(TokenSettings::new(
        apidoc_test::test_key(),
        SigningAlgorithm::Hs256,
        Duration::from_secs(3600),
    ));
    let token = foreign
        .issue_at(JIMMY, jimmy_grants(), now() - 86_400)
        .unwrap()
        .token;
    let (status, body) = send(&app(), get("/apps", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_expired_token_asks_for_login() {
    let token = test_codec()
        .issue_at(JIMMY, jimmy_grants(), now() - 7200)
        .unwrap()
        .token;
    let (status, body) = send(&app(), get("/apps", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_token_expired");
    assert_eq!(body["message"], "Access token has expired, please login again");
}

#[tokio::test]
async fn test_superuser_reaches_everything() {
    let app = app();
    let (status, body) = login(&app, ROOT, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_owned();

    for path in ["/apps", "/apps/app2", "/apps/app2/docs", "/docs/app2.guide", "/docs/app2.guide/versions"] {
        let (status, _) = send(&app, get(path, Some(&token))).await;
        assert_eq!(status, StatusCode::OK, "{path}");
    }
}

// ---------------------------------------------------------------------------
// Apps and docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_apps() {
    let app = app();
    let token = issue_token(JIMMY, jimmy_grants());

    let (status, body) = send(&app, get("/apps", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["hits"][0]["_id"], "app1");

    let (status, body) = send(&app, get("/apps/app1/docs", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = send(&app, get("/apps/app2/docs", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_scope_mismatch");

    let (status, _) = send(&app, get("/apps/missing", Some(&root_token()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_doc_versions_and_branches() {
    let app = app();
    let token = issue_token(JIMMY, jimmy_grants());

    let (status, body) = send(&app, get("/docs/guide/versions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (status, body) = send(&app, get("/docs/guide/versions/1.0/branches", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = send(&app, get("/docs/api/versions", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_scope_mismatch");
}

#[tokio::test]
async fn test_qualified_doc_id_needs_superuser() {
    let app = app();
    let jimmy = issue_token(JIMMY, jimmy_grants());
    let dotted = issue_token(JIMMY, GrantSet::from_scopes(["read:doc.versions:app1.guide"]));

    for token in [&jimmy, &dotted] {
        let (status, body) = send(&app, get("/docs/app1.guide/versions", Some(token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "access_scope_mismatch");
    }

    let root = root_token();
    let (status, body) = send(&app, get("/docs/app1.guide", Some(&root))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "User Guide");

    let (status, body) = send(&app, get("/docs/app1.guide/versions", Some(&root))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = send(&app, get("/docs/app1.guide/versions/1.0/branches", Some(&root))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_unqualified_doc_id_searches_every_app() {
    let (status, body) = send(&app(), get("/docs/guide/versions", Some(&root_token()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_bad_doc_id_is_400() {
    let (status, body) = send(&app(), get("/docs/a.b.c/versions", Some(&root_token()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request_param");
}

#[tokio::test]
async fn test_openapi_two_parameter_scope() {
    let app = app();
    let token = issue_token(JIMMY, jimmy_grants());

    let (status, body) = send(&app, get("/docs/openapi/app1/guide/1.0", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["version"], "1.0");

    let (status, body) = send(&app, get("/docs/openapi/app1/guide/1.0?branch=next", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["version"], "1.0-next");

    let (status, _) = send(&app, get("/docs/openapi/app1/guide/9.9", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/docs/openapi/app2/guide/1.0", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_scope_mismatch");

    let narrower = issue_token(JIMMY, GrantSet::from_scopes(["read:doc:app1"]));
    let (status, _) = send(&app, get("/docs/openapi/app1/guide/1.0", Some(&narrower))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_document_store_outage_is_503() {
    let state = AppState::new(test_authorizer(), Arc::new(FailingDocumentStore));
    let (status, body) = send(&app_with(state), get("/apps/app1", Some(&root_token()))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

// ---------------------------------------------------------------------------
// Registration and activation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_activate_login() {
    let app = app();
    let root = root_token();

    let (status, body) = send(
        &app,
        post(
            "/users",
            &json!({"username": "ana", "email": "ana@example.com", "acl": ["read:apps"]}),
            Some(&root),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ana");
    assert_eq!(body["email"], "ana@example.com");
    let code = body["code"].as_str().unwrap().to_owned();
    assert_eq!(code.len(), 21);

    let (status, _) = login(&app, "ana", "new-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post(
            "/users/activate",
            &json!({"username": "ana", "password": "new-password", "code": code}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = login(&app, "ana", "new-password").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_owned();
    let (status, _) = send(&app, get("/apps", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_and_scope() {
    let app = app();
    let body = json!({"username": JIMMY, "email": "other@example.com"});

    let (status, _) = send(&app, post("/users", &body, Some(&root_token()))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let jimmy = issue_token(JIMMY, jimmy_grants());
    let (status, body) = send(&app, post("/users", &body, Some(&jimmy))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "access_scope_mismatch");
}

#[tokio::test]
async fn test_register_validation() {
    let app = app();
    let root = root_token();

    let (status, body) = send(&app, post("/users", &json!({"username": "x y", "email": "nope"}), Some(&root))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let keywords: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["keyword"].as_str().unwrap())
        .collect();
    assert_eq!(keywords, ["pattern", "format"]);

    let (status, body) = send(
        &app,
        post("/users", &json!({"username": "bo", "email": "bo@x.io", "acl": ["read:"]}), Some(&root)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["params"]["property"], "acl");
}

#[tokio::test]
async fn test_activate_by_email() {
    let app = app();
    let (status, _) = send(
        &app,
        post(
            "/users/activate",
            &json!({"email": "pending@example.com", "password": "pw-1", "code": PENDING_CODE}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, PENDING, "pw-1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_activate_rejections() {
    let app = app();

    let (status, body) = send(
        &app,
        post("/users/activate", &json!({"username": PENDING, "password": "pw", "code": "wrong"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_registration_code");

    let (status, _) = send(
        &app,
        post("/users/activate", &json!({"username": JIMMY, "password": "pw", "code": "anything"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post("/users/activate", &json!({"username": "ghost", "password": "pw", "code": "c"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, post("/users/activate", &json!({"password": "pw", "code": "c"}), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["keyword"], "required");
    assert_eq!(body["errors"][0]["params"]["missingProperty"], json!(["username", "email"]));

    let (status, body) = send(
        &app,
        post(
            "/users/activate",
            &json!({"username": PENDING, "email": "pending@example.com", "password": "pw", "code": "c"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["keyword"], "exclusiveRequired");
}

// ---------------------------------------------------------------------------
// Cross-cutting layers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_request_id_is_echoed() {
    let id = "6f1c2a9e-3b7d-4c1e-9a55-0d2f8e4b7a10";
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", id)
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], id);

    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/apps")
        .header(header::ORIGIN, "https://docs.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
