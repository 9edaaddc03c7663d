use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use faction_map::config::Config;
use faction_map::metrics;
use faction_map::pipeline::Pipeline;
use faction_map::rate_limit::RateLimiter;
use faction_map::upstream::{EliteBgsClient, Galaxy, InMemoryGalaxy};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("faction_map=info,tower_http=info")),
        )
        .init();

    let config = Arc::new(Config::load());
    metrics::register_metrics();

    let galaxy = match &config.fixture_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Serving galaxy data from fixture");
            Galaxy::Fixture(
                InMemoryGalaxy::from_fixture_file(path, config.upstream.page_size)
                    .expect("Failed to load galaxy fixture"),
            )
        }
        None => {
            tracing::info!(base_url = %config.upstream.base_url, "Using live galaxy API");
            Galaxy::Http(
                EliteBgsClient::new(&config.upstream).expect("Failed to build HTTP client"),
            )
        }
    };

    let rate_limiter = RateLimiter::per_minute(config.commands_per_minute);
    let pipeline = Arc::new(Pipeline::new(galaxy, config.clone()));

    let app = faction_map::api::router(pipeline, rate_limiter)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(
        port = config.port,
        threshold_ly = config.analysis.threshold_ly,
        "Faction map service listening"
    );
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
