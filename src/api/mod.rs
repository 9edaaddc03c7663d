// HTTP API routes: command execution, direct map rendering, health and metrics.

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::command::{parse_message, Command, CommandKind, FactionPair};
use crate::error::MapError;
use crate::metrics;
use crate::pipeline::{CommandReply, Pipeline};
use crate::rate_limit::RateLimiter;
use crate::report::ReportSection;
use crate::upstream::GalaxyApi;

const ANONYMOUS: &str = "anonymous";

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CommandRequest {
    pub content: String,
    pub requester: Option<String>,
}

#[derive(Deserialize)]
pub struct MapParams {
    pub primary: Option<String>,
    pub rival: Option<String>,
    pub requester: Option<String>,
}

// ── Response types ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AttachmentBody {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub data_hex: String,
}

#[derive(Serialize)]
pub struct CommandResponse {
    pub title: String,
    pub description: String,
    pub sections: Vec<ReportSection>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub attachment: Option<AttachmentBody>,
}

impl From<CommandReply> for CommandResponse {
    fn from(reply: CommandReply) -> Self {
        let attachment = reply.attachment.map(|a| AttachmentBody {
            size_bytes: a.bytes.len(),
            data_hex: hex::encode(&a.bytes),
            filename: a.filename,
            content_type: a.content_type,
        });
        Self {
            title: reply.report.title,
            description: reply.report.description,
            sections: reply.report.sections,
            generated_at: reply.report.generated_at,
            attachment,
        }
    }
}

// ── Shared application state ─────────────────────────────────────────

pub struct AppState<A> {
    pub pipeline: Arc<Pipeline<A>>,
    pub rate_limiter: RateLimiter,
}

// Manual impl: `A` itself need not be Clone.
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

// ── Error helpers ─────────────────────────────────────────────────────

fn json_error(status: StatusCode, kind: &str, msg: &str) -> Response {
    (status, Json(json!({ "error": msg, "kind": kind }))).into_response()
}

pub fn status_for(err: &MapError) -> StatusCode {
    match err {
        MapError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        MapError::FactionNotFound { .. } => StatusCode::NOT_FOUND,
        MapError::UpstreamFetch { .. } => StatusCode::BAD_GATEWAY,
        MapError::NoDataToRender => StatusCode::UNPROCESSABLE_ENTITY,
        MapError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn map_error(err: &MapError) -> Response {
    json_error(status_for(err), err.kind(), &err.user_message())
}

fn record(method: &str, endpoint: &str, status: StatusCode) {
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, status.as_str()])
        .inc();
}

fn requester_key(requester: Option<&str>) -> &str {
    requester
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(ANONYMOUS)
}

fn check_rate_limit<A>(state: &AppState<A>, requester: &str) -> Result<(), Response> {
    state.rate_limiter.check_limit(requester).map_err(|e| {
        metrics::RATE_LIMITED_TOTAL.inc();
        tracing::warn!(requester, "Command rate limited");
        json_error(StatusCode::TOO_MANY_REQUESTS, "rate_limited", &e.to_string())
    })
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router<A: GalaxyApi + 'static>(pipeline: Arc<Pipeline<A>>, rate_limiter: RateLimiter) -> Router {
    let state = AppState {
        pipeline,
        rate_limiter,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/commands", post(run_command::<A>))
        .route("/api/faction-map.png", get(faction_map_png::<A>))
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "faction-map" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn run_command<A: GalaxyApi + 'static>(
    State(state): State<AppState<A>>,
    Json(req): Json<CommandRequest>,
) -> Response {
    const ENDPOINT: &str = "/api/commands";
    let requester = requester_key(req.requester.as_deref());

    let command = match parse_message(&req.content) {
        Ok(Some(command)) => command,
        Ok(None) => {
            let usage = CommandKind::ALL
                .iter()
                .map(|k| format!("`{} <your faction>, <rival faction>`", k.prefix()))
                .collect::<Vec<_>>()
                .join(" or ");
            tracing::info!(requester, kind = "invalid_input", "Ignored non-command content");
            record("POST", ENDPOINT, StatusCode::BAD_REQUEST);
            return json_error(
                StatusCode::BAD_REQUEST,
                "invalid_input",
                &format!("Not a faction command. Try {usage}."),
            );
        }
        Err(e) => {
            tracing::info!(requester, kind = e.kind(), "Rejected command: {e}");
            record("POST", ENDPOINT, status_for(&e));
            return map_error(&e);
        }
    };

    if let Err(resp) = check_rate_limit(&state, requester) {
        record("POST", ENDPOINT, StatusCode::TOO_MANY_REQUESTS);
        return resp;
    }

    match state.pipeline.execute(&command).await {
        Ok(reply) => {
            record("POST", ENDPOINT, StatusCode::OK);
            (StatusCode::OK, Json(CommandResponse::from(reply))).into_response()
        }
        Err(e) => {
            record("POST", ENDPOINT, status_for(&e));
            map_error(&e)
        }
    }
}

async fn faction_map_png<A: GalaxyApi + 'static>(
    State(state): State<AppState<A>>,
    Query(params): Query<MapParams>,
) -> Response {
    const ENDPOINT: &str = "/api/faction-map.png";
    let requester = requester_key(params.requester.as_deref());

    let primary = params.primary.as_deref().map(str::trim).unwrap_or_default();
    let rival = params.rival.as_deref().map(str::trim).unwrap_or_default();
    if primary.is_empty() || rival.is_empty() {
        tracing::info!(requester, kind = "invalid_input", "Map request missing a faction");
        record("GET", ENDPOINT, StatusCode::BAD_REQUEST);
        return json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Both `primary` and `rival` query parameters are required.",
        );
    }

    if let Err(resp) = check_rate_limit(&state, requester) {
        record("GET", ENDPOINT, StatusCode::TOO_MANY_REQUESTS);
        return resp;
    }

    let command = Command {
        kind: CommandKind::FactionMap,
        pair: FactionPair {
            primary: primary.to_string(),
            rival: rival.to_string(),
        },
    };
    match state.pipeline.execute(&command).await {
        Ok(CommandReply {
            attachment: Some(attachment),
            ..
        }) => {
            record("GET", ENDPOINT, StatusCode::OK);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, attachment.content_type)],
                attachment.bytes,
            )
                .into_response()
        }
        Ok(_) => {
            let err = MapError::Render("no image produced".to_string());
            record("GET", ENDPOINT, status_for(&err));
            map_error(&err)
        }
        Err(e) => {
            record("GET", ENDPOINT, status_for(&e));
            map_error(&e)
        }
    }
}
