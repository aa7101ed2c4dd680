use api::rate_limit::RateLimitConfig;
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use mailer::{Email, MailError, Mailer};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{test_settings, TestApp, FRONTEND, PASSWORD};

struct BrokenRelay;

#[async_trait]
impl Mailer for BrokenRelay {
    async fn send(&self, _email: Email) -> Result<(), MailError> {
        Err(MailError::Delivery("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_register_sends_verification_link() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "name": "Sari", "email": "Sari@Example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["code"], json!(201));
    assert_eq!(body["message"], json!("Account created"));
    assert_eq!(body["payload"]["email"], json!("sari@example.com"));
    assert_eq!(body["payload"]["is_verified"], json!(false));
    assert!(body["payload"].get("password_hash").is_none());

    let id = body["payload"]["id"].as_i64().unwrap();
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "sari@example.com");
    assert_eq!(sent[0].subject, "Account Verification for ServiLog");
    assert!(sent[0].text.contains(&format!("{}/verify/{}", FRONTEND, id)));
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "email": "a@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Missing email, name, or password"));

    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "name": "A", "email": "a@example.com", "password": "password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email or password isn't valid"));

    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "name": "A", "email": "not-an-email", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email or password isn't valid"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    app.register("First", "dup@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "name": "Second", "email": "dup@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email already used"));
}

#[tokio::test]
async fn test_register_rolls_back_when_mail_fails() {
    let app = TestApp::with_mailer(Arc::new(BrokenRelay));
    let (status, body) = app
        .request(
            "POST",
            "/account/register",
            None,
            Some(json!({ "name": "Budi", "email": "budi@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(app.repo.account_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_enveloped() {
    let app = TestApp::new();
    let (status, body) = app
        .request_raw("POST", "/account/register", "{not json")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(400));
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new();
    let id = app.register("Dewi", "dewi@example.com").await;

    let login = json!({ "email": "dewi@example.com", "password": PASSWORD });
    let (status, body) = app
        .request("POST", "/account/login", None, Some(login.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Account isn't verified"));

    let (status, body) = app
        .request("POST", &format!("/account/verify/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Account verified"));

    let (status, body) = app
        .request("POST", &format!("/account/verify/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Account already verified"));

    let (status, body) = app.request("POST", "/account/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Login success"));
    assert_eq!(body["payload"]["account"]["id"], json!(id));
    assert!(body["payload"]["account"].get("password_hash").is_none());
    assert!(body["payload"]["token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn test_login_rejections() {
    let app = TestApp::new();
    app.signed_in("Eka", "eka@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/account/login",
            None,
            Some(json!({ "email": "eka@example.com", "password": "wrong!pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Invalid email or password"));

    let (status, _) = app
        .request(
            "POST",
            "/account/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request("POST", "/account/login", None, Some(json!({ "email": "eka@example.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Missing email or password"));
}

#[tokio::test]
async fn test_verify_unknown_account() {
    let app = TestApp::new();
    let (status, body) = app.request("POST", "/account/verify/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Account not found"));
}

#[tokio::test]
async fn test_token_required() {
    let app = TestApp::new();
    let (id, _) = app.signed_in("Fajar", "fajar@example.com").await;

    let (status, body) = app
        .request("GET", &format!("/account/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Unauthorized: No token provided"));

    let (status, body) = app
        .request("GET", &format!("/account/{}", id), Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Forbidden: Invalid or expired token"));
}

#[tokio::test]
async fn test_account_crud_is_owner_only() {
    let app = TestApp::new();
    let (id, token) = app.signed_in("Gita", "gita@example.com").await;
    let (other_id, _) = app.signed_in("Hadi", "hadi@example.com").await;

    let (status, body) = app
        .request("GET", &format!("/account/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Account found"));

    let (status, _) = app
        .request("GET", &format!("/account/{}", other_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request("GET", "/account/abc", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, body) = app
        .request(
            "PUT",
            &format!("/account/{}", id),
            Some(&token),
            Some(json!({ "name": "Gita", "email": "hadi@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email already used"));

    let (status, body) = app
        .request(
            "PUT",
            &format!("/account/{}", id),
            Some(&token),
            Some(json!({ "name": "Gita P.", "email": "gita@example.com", "password": "n3w!password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Account updated"));
    assert_eq!(body["payload"]["name"], json!("Gita P."));

    let (status, body) = app
        .request("DELETE", &format!("/account/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Account deleted"));

    let (status, _) = app
        .request("GET", &format!("/account/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_rate_limited() {
    let mut settings = test_settings();
    settings.rate_limit = RateLimitConfig {
        enabled: true,
        per_second: 60,
        burst_size: 1,
    };
    let app = TestApp::with_settings(settings);
    let peer: SocketAddr = "203.0.113.7:41000".parse().unwrap();

    let mut responses = Vec::new();
    for _ in 0..2 {
        let mut request = Request::post("/account/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "email": "nobody@example.com", "password": PASSWORD }).to_string(),
            ))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        responses.push((status, body));
    }

    assert_eq!(responses[0].0, StatusCode::NOT_FOUND);
    let (status, body) = &responses[1];
    assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(429));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Too many requests"));
}
