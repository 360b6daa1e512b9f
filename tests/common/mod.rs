//! Common test utilities and helpers.

#![allow(dead_code)]

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::TestServer;
use foodgram::{db, AppState, Config};
use serde_json::{json, Value};
use tempfile::TempDir;

/// 1x1 transparent PNG as a data URL.
pub const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// A running app over an in-memory database and a temporary media root.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _media: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let media = TempDir::new().expect("Failed to create media dir");
    let config = Config::for_tests(media.path());
    let state = AppState::new(config)
        .await
        .expect("Failed to build application state");
    let server =
        TestServer::new(foodgram::app(state.clone())).expect("Failed to start test server");

    TestApp {
        server,
        state,
        _media: media,
    }
}

/// Create a `Token` Authorization header value
pub fn token_auth(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Token {}", token)).unwrap()
}

impl TestApp {
    /// Register `username` and log in, returning `(user id, token)`.
    pub async fn user(&self, username: &str) -> (i64, String) {
        let email = format!("{}@example.com", username);
        let response = self
            .server
            .post("/api/users/")
            .json(&json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "password": "s3cret-pass",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = self
            .server
            .post("/api/auth/token/login/")
            .json(&json!({ "email": email, "password": "s3cret-pass" }))
            .await;
        response.assert_status_ok();
        let token = response.json::<Value>()["auth_token"]
            .as_str()
            .unwrap()
            .to_string();

        (id, token)
    }

    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        db::get_or_create_ingredient(&self.state.db, name, unit)
            .await
            .unwrap()
            .id
    }

    /// Publish a recipe through the API and return its id.
    pub async fn recipe(&self, token: &str, name: &str, lines: &[(i64, i64)]) -> i64 {
        let response = self
            .server
            .post("/api/recipes/")
            .add_header(AUTHORIZATION, token_auth(token))
            .json(&recipe_body(name, lines))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    pub async fn add_to_cart(&self, token: &str, recipe_id: i64) {
        self.server
            .post(&format!("/api/recipes/{}/shopping_cart/", recipe_id))
            .add_header(AUTHORIZATION, token_auth(token))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}

pub fn recipe_body(name: &str, lines: &[(i64, i64)]) -> Value {
    let ingredients: Vec<Value> = lines
        .iter()
        .map(|(id, amount)| json!({ "id": id, "amount": amount }))
        .collect();
    json!({
        "ingredients": ingredients,
        "image": PNG,
        "name": name,
        "text": "Mix everything and serve.",
        "cooking_time": 25,
    })
}
