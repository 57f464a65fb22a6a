//! Router-level tests: requests go through the full middleware stack

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::build_app;
use crate::common::migrations::setup_test_db;
use crate::common::AppState;
use crate::services::google::fake;

struct TestApp {
    router: Router,
    // Keeps the photos directory alive for the duration of the test
    _photos_dir: TempDir,
}

async fn test_app() -> TestApp {
    let (_fake, google) = fake::spawn("person@example.com").await;
    let photos_dir = TempDir::new().unwrap();
    let state = AppState::for_tests(setup_test_db().await, google, photos_dir.path().to_path_buf());

    TestApp {
        router: build_app(Arc::new(state)),
        _photos_dir: photos_dir,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the CSRF cookie set by the login redirect
fn csrf_cookie_value(response: &Response) -> String {
    set_cookies(response)
        .iter()
        .find_map(|c| c.strip_prefix("CSRFTOKEN="))
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string()
}

fn location_params(response: &Response) -> HashMap<String, String> {
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    reqwest::Url::parse(location)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

fn callback_request(state: &str, cookie: &str) -> Request<Body> {
    Request::get(format!(
        "/authenticate/google/callback?code=auth-code&state={}",
        urlencoding::encode(state)
    ))
    .header(header::COOKIE, format!("CSRFTOKEN={}", cookie))
    .body(Body::empty())
    .unwrap()
}

fn assert_csrf_cookie_cleared(response: &Response) {
    let cookies = set_cookies(response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("CSRFTOKEN=") && c.contains("Max-Age=0")),
        "expected CSRF cookie removal, got {:?}",
        cookies
    );
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_login_start_redirects_and_sets_cookie() {
    let app = test_app().await;

    let response = app
        .get("/authenticate/google?redirectUrl=http%3A%2F%2Flocalhost%3A3000%2Fdone")
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let params = location_params(&response);
    assert_eq!(params["redirect_uri"], "http://localhost:3000/done");
    assert!(params["state"].ends_with("|http://localhost:3000/done"));

    let cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("CSRFTOKEN="))
        .unwrap();
    assert!(cookie.contains("Path=/authenticate"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_full_login_then_me() {
    let app = test_app().await;

    let start = app.get("/authenticate/google").await;
    let state = location_params(&start)["state"].clone();
    let cookie = csrf_cookie_value(&start);

    let response = app.send(callback_request(&state, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_csrf_cookie_cleared(&response);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "person@example.com");
    let token = body["token"].as_str().unwrap().to_string();

    let me = app
        .send(
            Request::get("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["user"]["id"], body["user"]["id"]);

    let logout = app
        .send(
            Request::post("/api/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(logout.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_callback_with_mismatched_cookie_is_forbidden_and_clears_cookie() {
    let app = test_app().await;

    let first = app.get("/authenticate/google").await;
    let second = app.get("/authenticate/google").await;
    let state = location_params(&first)["state"].clone();

    let response = app
        .send(callback_request(&state, &csrf_cookie_value(&second)))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_csrf_cookie_cleared(&response);
    assert_eq!(body_json(response).await["code"], "CSRF_MISMATCH");
}

#[tokio::test]
async fn test_callback_with_malformed_state_is_bad_request() {
    let app = test_app().await;

    let response = app
        .get("/authenticate/google/callback?code=auth-code&state=no-separator")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_csrf_cookie_cleared(&response);
    assert_eq!(body_json(response).await["code"], "MALFORMED_STATE");
}

#[tokio::test]
async fn test_callback_with_unreadable_query_still_clears_cookie() {
    let app = test_app().await;

    let response = app
        .send(
            Request::get("/authenticate/google/callback?code=c&state=a%7Cb&state=c%7Cd")
                .header(header::COOKIE, "CSRFTOKEN=whatever")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_csrf_cookie_cleared(&response);
    assert_eq!(body_json(response).await["code"], "MALFORMED_STATE");
}

#[tokio::test]
async fn test_callback_without_code_is_malformed_state() {
    let app = test_app().await;

    let start = app.get("/authenticate/google").await;
    let state = location_params(&start)["state"].clone();
    let response = app
        .send(
            Request::get(format!(
                "/authenticate/google/callback?state={}",
                urlencoding::encode(&state)
            ))
            .header(header::COOKIE, format!("CSRFTOKEN={}", csrf_cookie_value(&start)))
            .body(Body::empty())
            .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_csrf_cookie_cleared(&response);
    assert_eq!(body_json(response).await["code"], "MALFORMED_STATE");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = test_app().await;

    let response = app.get("/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(
            Request::get("/api/me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_journal_entries_round_trip() {
    let app = test_app().await;

    let created = app
        .send(
            Request::post("/api/journal-entries")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Day one","body":"Started a journal"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let created = body_json(created).await;
    assert_eq!(created["title"], "Day one");

    let listed = body_json(app.get("/api/journal-entries").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_journal_entry_without_body_is_rejected() {
    let app = test_app().await;

    let response = app
        .send(
            Request::post("/api/journal-entries")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Empty","body":"  "}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_journal_entry_with_missing_body_field_is_json_error() {
    let app = test_app().await;

    let response = app
        .send(
            Request::post("/api/journal-entries")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"No body"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

fn multipart_upload(filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "photo-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::post("/api/photos")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_photo_upload_dedup_and_content() {
    let app = test_app().await;
    let png_magic: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    let first = app.send(multipart_upload("a.png", png_magic)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;
    assert_eq!(first["name"], "a.png");
    assert_eq!(first["size"], png_magic.len());

    let again = body_json(app.send(multipart_upload("b.png", png_magic)).await).await;
    assert_eq!(again["id"], first["id"]);

    let listed = body_json(app.get("/api/photos").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let content = app
        .get(&format!("/api/photos/{}/content", first["id"].as_str().unwrap()))
        .await;
    assert_eq!(content.status(), StatusCode::OK);
    assert_eq!(content.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(content).await, png_magic);
}

#[tokio::test]
async fn test_photo_upload_without_file_field() {
    let app = test_app().await;

    let boundary = "photo-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
        b = boundary
    );
    let response = app
        .send(
            Request::post("/api/photos")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_photo_is_not_found() {
    let app = test_app().await;

    let response = app.get("/api/photos/P_NOPE/content").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
