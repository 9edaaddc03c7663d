// HTTP surface tests driven through the router with `oneshot`.

mod common;

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use faction_map::api::router;
use faction_map::config::Config;
use faction_map::pipeline::Pipeline;
use faction_map::rate_limit::RateLimiter;
use faction_map::upstream::{Galaxy, InMemoryGalaxy};

use common::{contested_galaxy, CapturedLogs};

fn app(galaxy: InMemoryGalaxy, commands_per_minute: usize) -> Router {
    let pipeline = Arc::new(Pipeline::new(galaxy, Arc::new(Config::default())));
    router(pipeline, RateLimiter::per_minute(commands_per_minute))
}

fn command_request(content: &str, requester: &str) -> Request<Body> {
    let body = serde_json::json!({ "content": content, "requester": requester });
    Request::builder()
        .method("POST")
        .uri("/api/commands")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(contested_galaxy(), 6)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_faction_map_command_returns_report_and_png() {
    let response = app(contested_galaxy(), 6)
        .oneshot(command_request(
            "/factionmap Mother Gaia, Sirius Corporation",
            "cmdr-jameson",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["title"], "Mother Gaia vs Sirius Corporation");
    assert_eq!(body["sections"].as_array().unwrap().len(), 3);

    let attachment = &body["attachment"];
    assert_eq!(attachment["filename"], "faction_map.png");
    assert_eq!(attachment["content_type"], "image/png");
    let png = hex::decode(attachment["data_hex"].as_str().unwrap()).unwrap();
    assert_eq!(png.len() as u64, attachment["size_bytes"].as_u64().unwrap());
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_faction_report_command_has_no_attachment() {
    let response = app(contested_galaxy(), 6)
        .oneshot(command_request(
            "/factionreport Mother Gaia, Sirius Corporation",
            "cmdr-jameson",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["attachment"].is_null());
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app(contested_galaxy(), 0);

    let response = app
        .clone()
        .oneshot(command_request("/factionmap Mother Gaia", "a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_input");
    assert!(body["error"].as_str().unwrap().contains("/factionmap"));

    let response = app
        .clone()
        .oneshot(command_request("good morning", "a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(command_request("/factionmap mother gaia, Sirius Corporation", "a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "faction_not_found");
    assert!(body["error"].as_str().unwrap().contains("mother gaia"));
}

#[tokio::test]
async fn test_rejected_commands_are_logged() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let app = app(contested_galaxy(), 0);

    let response = app
        .clone()
        .oneshot(command_request("/factionmap OnlyOne", "cmdr-malformed"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(command_request("o7 commanders", "cmdr-chatty"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let output = logs.contents();
    let malformed = output.lines().find(|l| l.contains("cmdr-malformed")).unwrap();
    assert!(malformed.contains("invalid_input"));
    let chatty = output.lines().find(|l| l.contains("cmdr-chatty")).unwrap();
    assert!(chatty.contains("Ignored non-command content"));
}

#[tokio::test]
async fn test_rate_limit_per_requester() {
    let app = app(contested_galaxy(), 1);
    let content = "/factionreport Mother Gaia, Sirius Corporation";

    let first = app.clone().oneshot(command_request(content, "alice")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(command_request(content, "alice")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.oneshot(command_request(content, "bob")).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_png_endpoint_serves_fixture_galaxy() {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/galaxy.json");
    let galaxy = Galaxy::Fixture(InMemoryGalaxy::from_fixture_file(&fixture, 50).unwrap());
    let pipeline = Arc::new(Pipeline::new(galaxy, Arc::new(Config::default())));
    let app = router(pipeline, RateLimiter::per_minute(0));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/faction-map.png?primary=Mother%20Gaia&rival=Sirius%20Corporation")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[1..4], b"PNG");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/faction-map.png?primary=Mother%20Gaia")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    faction_map::metrics::register_metrics();
    let response = app(contested_galaxy(), 6)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("faction_map_"));
}
