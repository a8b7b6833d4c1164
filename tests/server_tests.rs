//! # Server Tests
//!
//! Drive the axum router in-process with `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use codegen_pro::server::{ServerConfig, router};
use serde_json::{Value, json};
use tower::ServiceExt;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const BODY_LIMIT: usize = 16 * 1024 * 1024;

fn app() -> Router {
    router(ServerConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), BODY_LIMIT).await.unwrap();
    (status, bytes.to_vec(), headers)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_of(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, req).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, state) = json_of(app, post_json("/api/sessions", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    state["id"].as_str().unwrap().to_string()
}

// ============================================================================
// OPTION DATA
// ============================================================================

#[tokio::test]
async fn defaults_match_the_form() {
    let (status, opts) = json_of(&app(), get("/api/options/defaults")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opts["content"], "Hello World! QR Code Generator");
    assert_eq!(opts["codeType"], "QR");
    assert_eq!(opts["barcodeFormat"], "CODE128");
    assert_eq!(opts["qrErrorLevel"], "M");
    assert_eq!(opts["qrSize"], 300);
    assert_eq!(opts["backgroundColor"], "#ffffff");
    assert_eq!(opts["gradientColor2"], "#f0f9ff");
    assert_eq!(opts["displayValue"], true);
}

#[tokio::test]
async fn presets_and_formats_are_listed() {
    let app = app();
    let (_, presets) = json_of(&app, get("/api/presets")).await;
    assert_eq!(presets.as_array().unwrap().len(), 6);
    let (_, formats) = json_of(&app, get("/api/formats")).await;
    let names: Vec<_> = formats
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        ["CODE128", "CODE39", "EAN13", "EAN8", "UPC", "ITF14", "MSI", "pharmacode", "codabar"]
    );
}

// ============================================================================
// SESSIONS
// ============================================================================

#[tokio::test]
async fn session_lifecycle() {
    let app = app();
    let id = new_session(&app).await;

    let (status, state) = json_of(&app, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["status"], "rendered");

    let (status, state) = json_of(
        &app,
        post_json(
            &format!("/api/sessions/{id}/actions"),
            json!({"type": "setCodeType", "value": "BARCODE"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["options"]["content"], "1234567890");
    assert_eq!(state["status"], "rendered");
    assert_eq!(state["revision"], 2);

    let (status, bytes, headers) = send(&app, get(&format!("/api/sessions/{id}/preview"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn styling_action_does_not_rerender() {
    let app = app();
    let id = new_session(&app).await;
    let (_, state) = json_of(
        &app,
        post_json(
            &format!("/api/sessions/{id}/actions"),
            json!({"type": "setShadow", "value": true}),
        ),
    )
    .await;
    assert_eq!(state["status"], "unchanged");
    assert_eq!(state["revision"], 1);
    assert_eq!(state["options"]["shadow"], true);
}

#[tokio::test]
async fn out_of_range_action_is_clamped() {
    let app = app();
    let id = new_session(&app).await;
    let (status, state) = json_of(
        &app,
        post_json(
            &format!("/api/sessions/{id}/actions"),
            json!({"type": "setQrSize", "value": 5000}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["options"]["qrSize"], 500);
}

#[tokio::test]
async fn rejected_content_reports_error() {
    let app = app();
    let id = new_session(&app).await;
    for action in [
        json!({"type": "setCodeType", "value": "BARCODE"}),
        json!({"type": "setBarcodeFormat", "value": "EAN13"}),
    ] {
        json_of(&app, post_json(&format!("/api/sessions/{id}/actions"), action)).await;
    }
    let (_, state) = json_of(&app, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(state["status"], "rejected");
    assert!(state["error"].as_str().unwrap().contains("EAN13"));

    // Surface still has the last good render
    let (status, _, _) = send(&app, get(&format!("/api/sessions/{id}/preview"))).await;
    assert_eq!(status, StatusCode::OK);

    // Vector export re-encodes and fails
    let (status, _, _) = send(&app, get(&format!("/api/sessions/{id}/export/svg"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn randomize_sets_digits_for_barcode() {
    let app = app();
    let id = new_session(&app).await;
    json_of(
        &app,
        post_json(
            &format!("/api/sessions/{id}/actions"),
            json!({"type": "setCodeType", "value": "BARCODE"}),
        ),
    )
    .await;
    let (status, state) = json_of(
        &app,
        Request::post(format!("/api/sessions/{id}/randomize"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let content = state["options"]["content"].as_str().unwrap();
    assert!(content.chars().all(|c| c.is_ascii_digit()));
    assert!(content.len() <= 12);
}

#[tokio::test]
async fn export_sets_attachment_filename() {
    let app = app();
    let id = new_session(&app).await;
    let (status, bytes, headers) = send(&app, get(&format!("/api/sessions/{id}/export/png"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"qrcode-Hello Worl.png\""
    );
    assert_eq!(&bytes[..4], b"\x89PNG");

    let (status, bytes, headers) = send(&app, get(&format!("/api/sessions/{id}/export/svg"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
    assert!(bytes.starts_with(b"<svg"));
}

#[tokio::test]
async fn unknown_session_and_bad_ids() {
    let app = app();
    let (status, _, _) = send(&app, get("/api/sessions/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = send(
        &app,
        get("/api/sessions/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_export_format_is_not_found() {
    let app = app();
    let id = new_session(&app).await;
    let (status, _, _) = send(&app, get(&format!("/api/sessions/{id}/export/gif"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// STATELESS RENDER
// ============================================================================

#[tokio::test]
async fn stateless_svg_render() {
    let (status, bytes, headers) = send(
        &app(),
        post_json(
            "/api/render/svg",
            json!({"codeType": "BARCODE", "barcodeFormat": "EAN8", "content": "9638507"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"barcode-9638507.svg\""
    );
    assert!(String::from_utf8(bytes).unwrap().contains(">96385074</text>"));
}

#[tokio::test]
async fn stateless_png_rejection() {
    let (status, body, _) = send(
        &app(),
        post_json(
            "/api/render/png",
            json!({"codeType": "BARCODE", "barcodeFormat": "EAN13", "content": "12345"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!body.is_empty());
}

#[tokio::test]
async fn stateless_oversized_barcode_is_rejected() {
    let content = "x".repeat(10_000);
    let (status, body, _) = send(
        &app(),
        post_json(
            "/api/render/png",
            json!({"codeType": "BARCODE", "content": content, "width": 5, "height": 200}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(String::from_utf8(body).unwrap().contains("limit"));
}

#[tokio::test]
async fn randomize_keeps_content_matching_type() {
    let app = app();
    let id = new_session(&app).await;
    let (status, state) = json_of(
        &app,
        Request::post(format!("/api/sessions/{id}/randomize"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["options"]["codeType"], "QR");
    let content = state["options"]["content"].as_str().unwrap();
    assert!(!content.chars().all(|c| c.is_ascii_digit()));
}

// ============================================================================
// FRONTEND
// ============================================================================

#[tokio::test]
async fn index_injects_boot_data() {
    let (status, bytes, _) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("window.__BOOT="));
    assert!(html.contains("app.js?v="));
}

#[tokio::test]
async fn assets_are_served() {
    let (status, _, headers) = send(&app(), get("/assets/app.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/css"));
}
