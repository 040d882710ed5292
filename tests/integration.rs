//! Integration tests for the accessgate API.
//!
//! Each test spins up a real server on an ephemeral port, backed by an
//! in-memory session store, and talks to it over HTTP.

use accessgate::{
    auth::{middleware::AppState, sign_request, QueryParams, SignatureScheme},
    config::Config,
    middleware::security_headers,
    models::SessionRecord,
    routes,
    storage::MemorySessionStore,
};
use std::sync::Arc;

const TOKEN: &str = "s3cret-signing-token";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn test_config(access_expire_secs: u64, signature_scheme: SignatureScheme) -> Config {
    Config {
        redis_url: "redis://127.0.0.1:6379".to_string(),
        redis_prefix: String::new(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        access_expire_secs,
        signature_scheme,
    }
}

/// Spin up a test server and return its base URL plus the store behind it.
async fn spawn_test_server(config: Config) -> (String, MemorySessionStore) {
    let store = MemorySessionStore::new();
    store.insert(SessionRecord {
        session_id: "user-1".to_string(),
        expire_at: 0,
        signing_token: TOKEN.to_string(),
    });

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
    };

    let app = routes::api_router(state).layer(axum::middleware::from_fn(security_headers));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), store)
}

/// Helper: send a signed GET for `path_and_query`.
async fn signed_get(
    client: &reqwest::Client,
    base_url: &str,
    path_and_query: &str,
    session_id: &str,
    timestamp: i64,
    scheme: SignatureScheme,
) -> reqwest::Response {
    let (path, query) = path_and_query
        .split_once('?')
        .unwrap_or((path_and_query, ""));
    let ts = timestamp.to_string();
    let sign = sign_request(scheme, path, &QueryParams::parse(Some(query)), TOKEN, &ts);

    client
        .get(format!("{}{}", base_url, path_and_query))
        .header("Access-Sign", sign)
        .header("Access-Time", ts)
        .header("Access-UUID", session_id)
        .send()
        .await
        .expect("Failed to send request")
}

async fn json_body(resp: reqwest::Response) -> serde_json::Value {
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ============================================================================
// Gate Tests
// ============================================================================

#[tokio::test]
async fn test_signed_request_reaches_handler() {
    let (base_url, _store) = spawn_test_server(test_config(60, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session?_=17&page=2",
        "user-1",
        now(),
        SignatureScheme::Md5,
    )
    .await;
    let body = json_body(resp).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "success");
    assert_eq!(body["data"]["session_id"], "user-1");
    assert_eq!(body["data"]["expire_at"], 0);
}

#[tokio::test]
async fn test_missing_headers() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/session", base_url))
        .header("Access-UUID", "user-1")
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;

    assert_eq!(body["code"], -1);
    assert_eq!(body["msg"], "invalid token");
}

#[tokio::test]
async fn test_unknown_session() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session",
        "nobody",
        now(),
        SignatureScheme::Md5,
    )
    .await;
    let body = json_body(resp).await;

    assert_eq!(body["code"], 403);
    assert_eq!(body["msg"], "not logged in");
}

#[tokio::test]
async fn test_expired_session() {
    let (base_url, store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    store.insert(SessionRecord {
        session_id: "user-2".to_string(),
        expire_at: now() - 10,
        signing_token: TOKEN.to_string(),
    });
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session",
        "user-2",
        now(),
        SignatureScheme::Md5,
    )
    .await;
    let body = json_body(resp).await;

    assert_eq!(body["code"], 403);
    assert_eq!(body["msg"], "login expired");
}

#[tokio::test]
async fn test_session_with_future_expiry() {
    let (base_url, store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let expire_at = now() + 3600;
    store.insert(SessionRecord {
        session_id: "user-3".to_string(),
        expire_at,
        signing_token: TOKEN.to_string(),
    });
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session",
        "user-3",
        now(),
        SignatureScheme::Md5,
    )
    .await;
    let body = json_body(resp).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["expire_at"], expire_at);
}

#[tokio::test]
async fn test_stale_request() {
    let (base_url, _store) = spawn_test_server(test_config(60, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session",
        "user-1",
        now() - 120,
        SignatureScheme::Md5,
    )
    .await;
    let body = json_body(resp).await;

    assert_eq!(body["code"], -1);
    assert_eq!(body["msg"], "request expired");
}

#[tokio::test]
async fn test_old_timestamp_allowed_when_freshness_disabled() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = signed_get(
        &client,
        &base_url,
        "/api/session",
        "user-1",
        1,
        SignatureScheme::Md5,
    )
    .await;
    assert_eq!(json_body(resp).await["code"], 0);
}

#[tokio::test]
async fn test_tampered_query_rejected() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let ts = now().to_string();
    let sign = sign_request(
        SignatureScheme::Md5,
        "/api/session",
        &QueryParams::parse(Some("_=1&amount=10")),
        TOKEN,
        &ts,
    );

    let resp = client
        .get(format!("{}/api/session?_=1&amount=1000", base_url))
        .header("Access-Sign", sign)
        .header("Access-Time", ts)
        .header("Access-UUID", "user-1")
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;

    assert_eq!(body["code"], -1);
    assert_eq!(body["msg"], "signature verification failed");
}

#[tokio::test]
async fn test_leading_parameter_is_unsigned() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let ts = now().to_string();
    let sign = sign_request(
        SignatureScheme::Md5,
        "/api/session",
        &QueryParams::parse(Some("_=1&page=2")),
        TOKEN,
        &ts,
    );

    // Cache-buster in the leading position may change without re-signing
    let resp = client
        .get(format!("{}/api/session?_=999&page=2", base_url))
        .header("Access-Sign", sign.to_uppercase())
        .header("Access-Time", ts)
        .header("Access-UUID", "user-1")
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp).await["code"], 0);
}

#[tokio::test]
async fn test_hmac_scheme() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::HmacSha256)).await;
    let client = reqwest::Client::new();

    let ok = signed_get(
        &client,
        &base_url,
        "/api/session?_=1",
        "user-1",
        now(),
        SignatureScheme::HmacSha256,
    )
    .await;
    assert_eq!(json_body(ok).await["code"], 0);

    // A legacy MD5 signature is not accepted once the server uses HMAC
    let legacy = signed_get(
        &client,
        &base_url,
        "/api/session?_=1",
        "user-1",
        now(),
        SignatureScheme::Md5,
    )
    .await;
    assert_eq!(
        json_body(legacy).await["msg"],
        "signature verification failed"
    );
}

// ============================================================================
// Handler Tests
// ============================================================================

async fn post_profile(
    client: &reqwest::Client,
    base_url: &str,
    form: &[(&str, &str)],
) -> serde_json::Value {
    let ts = now().to_string();
    let sign = sign_request(
        SignatureScheme::Md5,
        "/api/profile",
        &QueryParams::default(),
        TOKEN,
        &ts,
    );

    let resp = client
        .post(format!("{}/api/profile", base_url))
        .header("Access-Sign", sign)
        .header("Access-Time", ts)
        .header("Access-UUID", "user-1")
        .form(form)
        .send()
        .await
        .unwrap();
    json_body(resp).await
}

#[tokio::test]
async fn test_profile_validation_errors() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let body = post_profile(
        &client,
        &base_url,
        &[("email", "not-an-email"), ("age", "7"), ("birthday", "")],
    )
    .await;

    assert_eq!(body["code"], -1);
    assert_eq!(body["msg"], "validation failed");
    assert_eq!(
        body["data"],
        serde_json::json!([
            "Nickname must not be empty",
            "Email must be a valid email address",
            "Age must be between 13 and 130",
        ])
    );
}

#[tokio::test]
async fn test_profile_accepted() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let body = post_profile(
        &client,
        &base_url,
        &[
            ("nickname", "ada"),
            ("email", "ada@example.com"),
            ("age", "36"),
            ("birthday", "1815-12-10"),
        ],
    )
    .await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["session_id"], "user-1");
    assert_eq!(body["data"]["nickname"], "ada");
    assert_eq!(body["data"]["age"], 36);
}

#[tokio::test]
async fn test_profile_requires_signature() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/profile", base_url))
        .form(&[("nickname", "ada")])
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp).await["msg"], "invalid token");
}

// ============================================================================
// Ambient Tests
// ============================================================================

#[tokio::test]
async fn test_health_is_ungated() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let body = json_body(resp).await;
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn test_security_headers_on_rejection() {
    let (base_url, _store) = spawn_test_server(test_config(0, SignatureScheme::Md5)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/session", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
}
