#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] drives the REAL router, built the same way as `main.rs`, over
//! in-memory adapters and an in-memory session store. No PostgreSQL or Redis
//! is needed.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::cookie::SameSite;

use quickmenu_kernel::services::MenuGenerator;
use quickmenu_kernel::{AppState, routes, session};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub uploads_dir: PathBuf,
}

impl TestApp {
    /// Create a test application without AI auto-fill.
    pub fn new() -> Self {
        Self::with_generator(None)
    }

    /// Create a test application with the given generator.
    pub fn with_generator(generator: Option<Arc<dyn MenuGenerator>>) -> Self {
        let uploads_dir =
            std::env::temp_dir().join(format!("quickmenu-test-{}", uuid::Uuid::now_v7()));
        let state = quickmenu_test_utils::memory_state(&uploads_dir, generator);

        let router = routes::app(
            state.clone(),
            session::memory_session_layer(SameSite::Strict, false),
        );

        Self {
            router,
            state,
            uploads_dir,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// Send a JSON request, optionally authenticated.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookies: &str,
    ) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.request_with_cookies(request, cookies).await
    }

    /// Sign up a new owner and return the session cookie.
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let response = self
            .json(
                "POST",
                "/api/auth/signup",
                Some(serde_json::json!({ "email": email, "password": password })),
                "",
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "signup failed");
        extract_cookies(&response)
    }

    /// Sign up a fresh owner with a unique email.
    pub async fn owner(&self) -> String {
        let email = format!("owner-{}@example.com", uuid::Uuid::now_v7().simple());
        self.signup(&email, "correct horse battery").await
    }

    /// Create a menu as the owner behind `cookies` and return its id.
    pub async fn create_menu(&self, cookies: &str, business_name: &str) -> String {
        let response = self
            .json(
                "POST",
                "/api/menus",
                Some(serde_json::json!({ "business_name": business_name })),
                cookies,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"]
            .as_str()
            .expect("menu id")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

/// Extract session cookies from a response's `Set-Cookie` headers.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
