//! HTTP integration tests.
//!
//! Drive the real router with in-memory adapters: authentication, owner-only
//! access, the editor save/publish flow, uploads, AI auto-fill, and the
//! public viewer endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::{TestApp, body_json, extract_cookies};
use quickmenu_test_utils::StubGenerator;

// ============================================================================
// Health and authentication
// ============================================================================

#[tokio::test]
async fn health_reports_store() {
    let app = TestApp::new();
    let response = app.json("GET", "/health", None, "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], true);
    assert_eq!(body["ai"], false);
}

#[tokio::test]
async fn signup_login_session_logout() {
    let app = TestApp::new();
    let cookies = app.signup("chef@example.com", "tiramisu42").await;
    assert!(!cookies.is_empty());

    let response = app.json("GET", "/api/auth/session", None, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "chef@example.com");

    let response = app.json("POST", "/api/auth/logout", None, &cookies).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.json("GET", "/api/auth/session", None, &cookies).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .json(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "CHEF@example.com", "password": "tiramisu42" })),
            "",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_cookies(&response);

    let response = app.json("GET", "/api/auth/session", None, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.signup("chef@example.com", "tiramisu42").await;

    let response = app
        .json(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "chef@example.com", "password": "panna cotta" })),
            "",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn signup_errors() {
    let app = TestApp::new();
    app.signup("chef@example.com", "tiramisu42").await;

    let duplicate = app
        .json(
            "POST",
            "/api/auth/signup",
            Some(json!({ "email": "chef@example.com", "password": "tiramisu42" })),
            "",
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let weak = app
        .json(
            "POST",
            "/api/auth/signup",
            Some(json!({ "email": "new@example.com", "password": "short" })),
            "",
        )
        .await;
    assert_eq!(weak.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_routes_require_login() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/menus"),
        ("GET", "/api/slugs/roma/availability"),
        ("DELETE", "/api/menus/0190f2a0-0000-7000-8000-000000000000"),
    ] {
        let response = app.json(method, uri, None, "").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    let response = app
        .json("POST", "/api/menus", Some(json!({ "business_name": "Roma" })), "")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Owner menus
// ============================================================================

#[tokio::test]
async fn create_and_list_menus() {
    let app = TestApp::new();
    let cookies = app.owner().await;

    let id = app.create_menu(&cookies, "Roma").await;

    let response = app.json("GET", "/api/menus", None, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    let menus = body_json(response).await;
    assert_eq!(menus.as_array().unwrap().len(), 1);
    assert_eq!(menus[0]["id"], id.as_str());
    assert_eq!(menus[0]["currency"], "EUR");
    assert_eq!(menus[0]["is_published"], false);

    let response = app
        .json(
            "POST",
            "/api/menus",
            Some(json!({ "business_name": "   " })),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_owners_menu_is_not_found() {
    let app = TestApp::new();
    let owner = app.owner().await;
    let intruder = app.owner().await;
    let id = app.create_menu(&owner, "Roma").await;
    let uri = format!("/api/menus/{id}");

    let response = app.json("GET", &uri, None, &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let draft = json!({ "id": id, "business_name": "Mine now", "currency": "EUR" });
    let response = app.json("PUT", &uri, Some(draft.clone()), &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .json("POST", &format!("{uri}/publish"), Some(draft), &intruder)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.json("DELETE", &uri, None, &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.json("GET", &uri, None, &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["business_name"], "Roma");
}

#[tokio::test]
async fn save_publish_and_view_publicly() {
    let app = TestApp::new();
    let cookies = app.owner().await;
    let id = app.create_menu(&cookies, "Café Roma").await;
    let uri = format!("/api/menus/{id}");

    let draft = json!({
        "id": id,
        "business_name": "Café Roma",
        "currency": "EUR",
        "categories": ["Mains", "Drinks"],
        "items": [
            { "name": "Lasagne", "price": 12.5, "category": "Mains" },
            { "name": "Chinotto", "price": 3.0, "category": "Drinks", "is_available": false }
        ]
    });
    let response = app.json("PUT", &uri, Some(draft.clone()), &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["categories"], json!(["Mains", "Drinks"]));
    assert_eq!(saved["items"][1]["is_available"], false);
    assert_eq!(saved["is_published"], false);

    // Draft menus are invisible to the public.
    let response = app.json("GET", "/api/public/menus/caf-roma", None, "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .json("POST", &format!("{uri}/publish"), Some(draft), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let published = body_json(response).await;
    assert_eq!(published["slug"], "caf-roma");
    assert_eq!(
        published["public_url"],
        "https://quickmenu.test/menu/caf-roma"
    );
    assert_eq!(published["is_published"], true);

    let response = app
        .json("GET", "/api/slugs/caf-roma/availability", None, &cookies)
        .await;
    assert_eq!(body_json(response).await["available"], false);

    let response = app.json("GET", "/api/public/menus/caf-roma", None, "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let public = body_json(response).await;
    assert_eq!(public["business_name"], "Café Roma");
    assert_eq!(public["items"][0]["name"], "Lasagne");
    assert_eq!(public["items"][0]["category"], "Mains");
    assert!(public.get("owner_id").is_none());
}

#[tokio::test]
async fn invalid_draft_is_bad_request() {
    let app = TestApp::new();
    let cookies = app.owner().await;
    let id = app.create_menu(&cookies, "Roma").await;

    let draft = json!({
        "id": id,
        "business_name": "Roma",
        "currency": "EUR",
        "categories": ["Mains", "Mains"]
    });
    let response = app
        .json("PUT", &format!("/api/menus/{id}"), Some(draft), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn taken_slug_is_conflict() {
    let app = TestApp::new();
    let first = app.owner().await;
    let second = app.owner().await;
    let first_id = app.create_menu(&first, "Roma").await;
    let second_id = app.create_menu(&second, "Roma").await;

    let response = app
        .json(
            "POST",
            &format!("/api/menus/{first_id}/publish"),
            Some(json!({ "id": first_id, "business_name": "Roma", "currency": "EUR" })),
            &first,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Saving a slug someone else holds is refused outright.
    let response = app
        .json(
            "PUT",
            &format!("/api/menus/{second_id}"),
            Some(json!({
                "id": second_id,
                "business_name": "Roma",
                "currency": "EUR",
                "slug": "roma",
                "public_url": "https://quickmenu.test/menu/roma"
            })),
            &second,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn conflicting_item_id_hides_store_details() {
    let app = TestApp::new();
    let first = app.owner().await;
    let second = app.owner().await;
    let first_id = app.create_menu(&first, "Roma").await;
    let second_id = app.create_menu(&second, "Napoli").await;

    let response = app
        .json(
            "PUT",
            &format!("/api/menus/{first_id}"),
            Some(json!({
                "id": first_id,
                "business_name": "Roma",
                "currency": "EUR",
                "items": [{ "name": "Lasagne", "price": 12.5 }]
            })),
            &first,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let item_id = body_json(response).await["items"][0]["id"].clone();

    // Claiming another menu's item id is refused without naming the row.
    let response = app
        .json(
            "PUT",
            &format!("/api/menus/{second_id}"),
            Some(json!({
                "id": second_id,
                "business_name": "Napoli",
                "currency": "EUR",
                "items": [{ "id": item_id, "name": "Pizza", "price": 9.0 }]
            })),
            &second,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains(item_id.as_str().unwrap()));
    assert!(!message.contains("duplicate"));
}

#[tokio::test]
async fn delete_menu_then_not_found() {
    let app = TestApp::new();
    let cookies = app.owner().await;
    let id = app.create_menu(&cookies, "Roma").await;
    let uri = format!("/api/menus/{id}");

    let response = app.json("DELETE", &uri, None, &cookies).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.json("GET", &uri, None, &cookies).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.json("DELETE", &uri, None, &cookies).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// AI auto-fill
// ============================================================================

#[tokio::test]
async fn generate_without_generator_is_unavailable() {
    let app = TestApp::new();
    let cookies = app.owner().await;

    let response = app
        .json(
            "POST",
            "/api/menus/generate",
            Some(json!({ "cuisine": "Italian", "business_name": "Roma" })),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn generate_returns_suggestion() {
    let app = TestApp::with_generator(Some(Arc::new(StubGenerator::coffee())));
    let cookies = app.owner().await;

    let response = app
        .json(
            "POST",
            "/api/menus/generate",
            Some(json!({ "cuisine": "Coffee", "business_name": "Bean There" })),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let menu = body_json(response).await;
    assert_eq!(menu["categories"], json!(["Coffee", "Pastries"]));
    assert_eq!(menu["items"][0]["name"], "Flat White");

    // Suggestions are not saved anywhere.
    let response = app.json("GET", "/api/menus", None, &cookies).await;
    assert_eq!(body_json(response).await, json!([]));
}

// ============================================================================
// Image upload
// ============================================================================

fn multipart_request(field: &str, data: &[u8], cookies: &str) -> Request<Body> {
    let boundary = "quickmenu-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post("/api/images")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookies)
        .body(Body::from(body))
        .unwrap()
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::new(32, 32))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn upload_image_returns_public_url() {
    let app = TestApp::new();
    let cookies = app.owner().await;

    let response = app
        .request(multipart_request("file", &png_bytes(), &cookies))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uploaded = body_json(response).await;
    let url = uploaded["url"].as_str().unwrap();
    assert!(url.starts_with("/files/"));
    assert!(url.ends_with(".jpg"));

    let stored = app.uploads_dir.join(url.trim_start_matches("/files/"));
    assert!(stored.exists());
}

#[tokio::test]
async fn upload_rejects_non_images_and_missing_field() {
    let app = TestApp::new();
    let cookies = app.owner().await;

    let response = app
        .request(multipart_request("file", b"%PDF-1.4 menu.pdf", &cookies))
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = app
        .request(multipart_request("photo", &png_bytes(), &cookies))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_login() {
    let app = TestApp::new();
    let response = app.request(multipart_request("file", &png_bytes(), "")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
