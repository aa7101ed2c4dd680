use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{TestApp, FRONTEND};

#[tokio::test]
async fn test_root_greeting() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(api::middleware::REQUEST_ID_HEADER));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ServiLog API is running");
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["database"], json!("ok"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_metrics_disabled() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Metrics are not enabled"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = Request::get("/health")
        .header(api::middleware::REQUEST_ID_HEADER, "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[api::middleware::REQUEST_ID_HEADER],
        "trace-me-42"
    );
}

#[tokio::test]
async fn test_cors_allows_frontend() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/vehicle")
        .header(header::ORIGIN, FRONTEND)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        FRONTEND
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/garage", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "success": false, "code": 404, "message": "Route not found", "payload": null })
    );

    let (status, body) = app.request("GET", "/vehicle/id/1/parts", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Route not found"));
}

#[tokio::test]
async fn test_wrong_method() {
    let app = TestApp::new();
    for (method, uri) in [("DELETE", "/health"), ("GET", "/account/login"), ("PATCH", "/part/1")] {
        let (status, body) = app.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!(405));
        assert_eq!(body["message"], json!("Method not allowed"));
    }
}

#[tokio::test]
async fn test_security_headers() {
    let app = TestApp::new();
    for uri in ["/health", "/garage"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff", "{}", uri);
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
        assert_eq!(headers["cross-origin-resource-policy"], "same-origin");
    }
}
