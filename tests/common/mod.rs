#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use briefhub_backend::config::AppConfig;
use briefhub_backend::entities::types::Role;
use briefhub_backend::services::auth_service::NewAccount;
use briefhub_backend::services::storage::StorageService;
use briefhub_backend::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

#[derive(Default)]
pub struct MockStorage {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl StorageService for MockStorage {
    async fn upload_file(&self, key: &str, data: Vec<u8>, _content_type: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete_file(&self, key: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://storage.test/{}", key)
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub storage: Arc<MockStorage>,
}

pub async fn setup_app() -> TestApp {
    let _ = tracing_subscriber::fmt::try_init();

    let db = Database::connect("sqlite::memory:").await.unwrap();
    briefhub_backend::infrastructure::database::run_migrations(&db)
        .await
        .unwrap();

    let mut config = AppConfig::development();
    config.auth.jwt_secret = "integration-test-secret".to_string();

    let storage = Arc::new(MockStorage::default());
    let state = AppState::new(db, Arc::new(config), storage.clone());
    let app = create_app(state.clone());

    TestApp {
        app,
        state,
        storage,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).to_string())
            })
        };
        (status, json)
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    /// Register a plain user and return `(user_id, access_token)`.
    pub async fn register_user(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["tokens"]["access_token"].as_str().unwrap().to_string(),
        )
    }

    /// Create a verified account of any role directly and log it in.
    pub async fn account_with_role(&self, username: &str, role: Role) -> (String, String) {
        let user = self
            .state
            .auth
            .create_account(NewAccount {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: PASSWORD.to_string(),
                role,
                is_verified: true,
            })
            .await
            .unwrap();
        let token = self.login(username).await;
        (user.id, token)
    }

    pub async fn login(&self, login: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "login": login, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["tokens"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_brand(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/brands",
                Some(token),
                Some(json!({
                    "name": name,
                    "contact_email": format!("{}@brand.test", name.to_lowercase()),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create brand failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_brief(&self, token: &str, brand_id: &str, title: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/brands/{}/briefs", brand_id),
                Some(token),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create brief failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn set_status(&self, token: &str, brief_id: &str, status: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            &format!("/api/briefs/{}/status", brief_id),
            Some(token),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// A brief owned by `token`'s user, already open for submissions.
    pub async fn open_brief(&self, token: &str) -> String {
        let brand_id = self
            .create_brand(token, &format!("Brand{}", uuid::Uuid::new_v4().simple()))
            .await;
        let brief_id = self.create_brief(token, &brand_id, "Logo").await;
        let (status, body) = self.set_status(token, &brief_id, "submission").await;
        assert_eq!(status, StatusCode::OK, "open brief failed: {}", body);
        brief_id
    }

    pub async fn submit(&self, token: &str, brief_id: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            &format!("/api/briefs/{}/submissions", brief_id),
            Some(token),
            Some(json!({ "description": "My take" })),
        )
        .await
    }
}
