// EliteBgsClient against a local stand-in for the galaxy service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use faction_map::config::UpstreamConfig;
use faction_map::error::{FetchStage, MapError, UpstreamError};
use faction_map::fetcher::{build_faction_set, fetch_systems};
use faction_map::presence::resolve_presence;
use faction_map::upstream::EliteBgsClient;

/// The live service pages by 10 regardless of our configured page size.
const SERVICE_PAGE: usize = 10;
const ALPHA_SYSTEMS: usize = 15;

#[derive(Clone, Copy)]
enum Behaviour {
    Healthy,
    Unavailable,
    /// Presence works, system lookups answer with a non-JSON body.
    GarbledLookups,
}

#[derive(Clone)]
struct Service {
    behaviour: Behaviour,
    queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

fn system_name(i: usize) -> String {
    format!("Alpha {i:02}")
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

async fn systems(
    State(service): State<Service>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    service.queries.lock().unwrap().push(query.clone());
    let page: usize = param(&query, "page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let faction = param(&query, "faction");

    match (service.behaviour, faction) {
        (Behaviour::Unavailable, _) => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
        (Behaviour::GarbledLookups, None) => {
            return (StatusCode::OK, "<html>down for maintenance</html>").into_response()
        }
        _ => {}
    }

    let docs: Vec<Value> = match faction {
        Some("Alpha") => (0..ALPHA_SYSTEMS)
            .map(|i| json!({ "name": system_name(i) }))
            .collect(),
        Some(_) => Vec::new(),
        None => query
            .iter()
            .filter(|(k, _)| k == "name")
            .map(|(_, name)| {
                json!({
                    "name": name,
                    "x": 1.0, "y": 2.0, "z": 3.0,
                    "controlling_minor_faction_cased": "Alpha"
                })
            })
            .collect(),
    };

    let start = (page - 1) * SERVICE_PAGE;
    let slice: Vec<Value> = docs.iter().skip(start).take(SERVICE_PAGE).cloned().collect();
    Json(json!({
        "docs": slice,
        "page": page,
        "hasNextPage": start + SERVICE_PAGE < docs.len(),
    }))
    .into_response()
}

async fn start_service(behaviour: Behaviour) -> (SocketAddr, Service) {
    let service = Service {
        behaviour,
        queries: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/systems", get(systems))
        .with_state(service.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, service)
}

fn limits(addr: SocketAddr) -> UpstreamConfig {
    UpstreamConfig {
        base_url: format!("http://{addr}"),
        ..UpstreamConfig::default()
    }
}

#[tokio::test]
async fn test_presence_follows_next_page_flag() {
    let (addr, service) = start_service(Behaviour::Healthy).await;
    let limits = limits(addr);
    let client = EliteBgsClient::new(&limits).unwrap();

    let names = resolve_presence(&client, "Alpha", &limits).await.unwrap();
    assert_eq!(names.len(), ALPHA_SYSTEMS);
    assert_eq!(names[0], "Alpha 00");
    assert_eq!(names[14], "Alpha 14");

    let queries = service.queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(param(&queries[0], "faction"), Some("Alpha"));
    assert_eq!(param(&queries[0], "page"), Some("1"));
    assert_eq!(param(&queries[1], "page"), Some("2"));
}

#[tokio::test]
async fn test_lookup_sends_repeated_names_and_pages() {
    let (addr, service) = start_service(Behaviour::Healthy).await;
    let limits = limits(addr);
    let client = EliteBgsClient::new(&limits).unwrap();
    let names: Vec<String> = (0..ALPHA_SYSTEMS).map(system_name).collect();

    let systems = fetch_systems(&client, "Alpha", &names, &limits).await.unwrap();
    assert_eq!(systems.len(), ALPHA_SYSTEMS);
    assert!(systems.iter().all(|s| s.is_controlled_by("Alpha")));

    let queries = service.queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    let sent: Vec<&str> = queries[0]
        .iter()
        .filter(|(k, _)| k == "name")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(sent.len(), ALPHA_SYSTEMS);
    assert_eq!(sent[3], "Alpha 03");
    assert_eq!(param(&queries[1], "page"), Some("2"));
}

#[tokio::test]
async fn test_full_faction_set_over_http() {
    let (addr, _service) = start_service(Behaviour::Healthy).await;
    let limits = limits(addr);
    let client = EliteBgsClient::new(&limits).unwrap();

    let set = build_faction_set(&client, "Alpha", &limits).await.unwrap();
    assert_eq!(set.len(), ALPHA_SYSTEMS);

    let err = build_faction_set(&client, "Beta", &limits).await.unwrap_err();
    assert!(matches!(err, MapError::FactionNotFound { .. }));
}

#[tokio::test]
async fn test_unavailable_service_fails_presence_stage() {
    let (addr, _service) = start_service(Behaviour::Unavailable).await;
    let limits = limits(addr);
    let client = EliteBgsClient::new(&limits).unwrap();

    let err = resolve_presence(&client, "Alpha", &limits).await.unwrap_err();
    match err {
        MapError::UpstreamFetch {
            stage,
            faction,
            source,
        } => {
            assert_eq!(stage, FetchStage::Presence);
            assert_eq!(faction, "Alpha");
            assert!(matches!(source, UpstreamError::Status(503)), "{source:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparsable_lookup_fails_systems_stage() {
    let (addr, _service) = start_service(Behaviour::GarbledLookups).await;
    let limits = limits(addr);
    let client = EliteBgsClient::new(&limits).unwrap();

    let err = build_faction_set(&client, "Alpha", &limits).await.unwrap_err();
    match err {
        MapError::UpstreamFetch {
            stage,
            faction,
            source,
        } => {
            assert_eq!(stage, FetchStage::Systems);
            assert_eq!(faction, "Alpha");
            assert!(matches!(source, UpstreamError::Decode(_)), "{source:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
