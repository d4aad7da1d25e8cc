// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use learnhub::{config::Config, db, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const ADMIN_EMAIL: &str = "root@learnhub.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port, backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single, never-recycled connection keeps the in-memory database alive.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        remember_me_expiration: 3600,
        bind_addr: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        admin_full_name: Some("Root Admin".to_string()),
    };

    db::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn signup(&self, email: &str, role: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/signup/"))
            .json(&json!({
                "full_name": "Test User",
                "email": email,
                "role": role,
                "password": password,
                "confirm_password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str, role: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login/"))
            .json(&json!({ "email": email, "password": password, "role": role }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Signs up and logs in, returning the bearer token.
    pub async fn register_and_login(&self, email: &str, role: &str) -> String {
        let resp = self.signup(email, role, "password123").await;
        assert_eq!(resp.status().as_u16(), 201, "signup of {} failed", email);
        self.login_token(email, "password123", role).await
    }

    pub async fn login_token(&self, email: &str, password: &str, role: &str) -> String {
        let body: Value = self
            .login(email, password, role)
            .await
            .json()
            .await
            .expect("Failed to parse login json");
        body["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a course as `token`'s owner and returns its id.
    pub async fn create_course(&self, token: &str, title: &str) -> i64 {
        let resp = self
            .post(
                "/courses/",
                token,
                json!({ "title": title, "description": "<p>Learn things</p>" }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn add_text_content(&self, token: &str, course_id: i64, title: &str) -> i64 {
        let resp = self
            .post(
                &format!("/courses/{}/contents/", course_id),
                token,
                json!({ "title": title, "content_type": "Text", "text_content": "Read me" }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}
