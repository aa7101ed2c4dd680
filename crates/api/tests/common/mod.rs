#![allow(dead_code)]

use api::rate_limit::RateLimitConfig;
use api::{create_router, AppState, Settings};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mailer::{LogMailer, Mailer};
use serde_json::{json, Value};
use std::sync::Arc;
use storage::MemoryRepository;
use tower::ServiceExt;

pub const PASSWORD: &str = "s3cret!pass";
pub const FRONTEND: &str = "https://app.servilog.test";

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_key = "integration-test-secret".to_string();
    settings.server.frontend_url = FRONTEND.to_string();
    // oneshot requests carry no peer address
    settings.rate_limit = RateLimitConfig::disabled();
    settings
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub mailer: Arc<LogMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mailer = Arc::new(LogMailer::new());
        Self::build(settings, mailer.clone(), mailer)
    }

    /// App sending mail through `transport`; `self.mailer` stays empty
    pub fn with_mailer(transport: Arc<dyn Mailer>) -> Self {
        Self::build(test_settings(), transport, Arc::new(LogMailer::new()))
    }

    fn build(settings: Settings, transport: Arc<dyn Mailer>, mailer: Arc<LogMailer>) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let state = AppState::new(settings, repo.clone(), transport, None)
            .expect("Failed to build state");
        Self {
            router: create_router(Arc::new(state)),
            repo,
            mailer,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_string(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Send a raw JSON body, valid or not
    pub async fn request_raw(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn register(&self, name: &str, email: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/account/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["payload"]["id"].as_i64().unwrap()
    }

    /// Register, verify and log in; returns account id and token
    pub async fn signed_in(&self, name: &str, email: &str) -> (i64, String) {
        let id = self.register(name, email).await;
        let (status, _) = self
            .request("POST", &format!("/account/verify/{}", id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .request(
                "POST",
                "/account/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (id, body["payload"]["token"].as_str().unwrap().to_string())
    }

    pub async fn create_vehicle(&self, token: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/vehicle",
                Some(token),
                Some(json!({ "name": "Daily", "brand": "Honda", "model": "Beat", "year": 2020 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "vehicle failed: {}", body);
        body["payload"]["id"].as_i64().unwrap()
    }

    pub async fn create_part(
        &self,
        token: &str,
        vehicle_id: i64,
        install_mileage: i64,
        lifetime_mileage: i64,
    ) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/part",
                Some(token),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "name": "Drive belt",
                    "brand": "Bando",
                    "model": "OEM",
                    "install_mileage": install_mileage,
                    "lifetime_mileage": lifetime_mileage
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "part failed: {}", body);
        body["payload"].clone()
    }

    pub async fn add_mileage(
        &self,
        token: &str,
        vehicle_id: i64,
        date: &str,
        mileage: i64,
    ) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/mileage",
            Some(token),
            Some(json!({ "vehicle_id": vehicle_id, "mileage": mileage, "date": date })),
        )
        .await
    }

    /// Subjects of every email sent so far
    pub fn subjects(&self) -> Vec<String> {
        self.mailer.sent().into_iter().map(|e| e.subject).collect()
    }
}
