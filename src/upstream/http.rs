// HTTP client for an EliteBGS-style `/systems` endpoint.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Semaphore;

use super::{GalaxyApi, Page};
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::metrics;
use crate::model::SystemRecord;

/// Paged response envelope shared by the presence and lookup queries.
#[derive(Debug, Deserialize)]
struct PagedDocs<T> {
    docs: Vec<T>,
    #[serde(rename = "hasNextPage", default)]
    has_next_page: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireSystem {
    name: String,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
    #[serde(rename = "controlling_minor_faction_cased", default)]
    controlling_faction: Option<String>,
}

impl From<WireSystem> for SystemRecord {
    fn from(w: WireSystem) -> Self {
        SystemRecord {
            name: w.name,
            x: w.x,
            y: w.y,
            z: w.z,
            controlling_faction: w.controlling_faction,
        }
    }
}

/// Throttled, timeout-bounded client. Cheap to clone.
#[derive(Clone)]
pub struct EliteBgsClient {
    http: reqwest::Client,
    base_url: String,
    page_size: usize,
    permits: Arc<Semaphore>,
}

impl EliteBgsClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("faction-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }

    async fn get_page<T>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<PagedDocs<T>, UpstreamError>
    where
        T: DeserializeOwned + Send,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let url = format!("{}/systems", self.base_url);
        let started = Instant::now();
        let result = async {
            let response = self
                .http
                .get(&url)
                .query(query)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(response.json::<PagedDocs<T>>().await?)
        }
        .await;

        metrics::UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(docs) => {
                metrics::UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[endpoint, "ok"])
                    .inc();
                Ok(docs)
            }
            Err(e) => {
                let err = UpstreamError::from(e);
                metrics::UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[endpoint, "error"])
                    .inc();
                tracing::warn!(endpoint, error = %err, "Upstream request failed");
                Err(err)
            }
        }
    }

    /// The service's `hasNextPage` decides; a short page ends paging only when
    /// the flag is absent. An empty page always ends it.
    fn has_more(&self, returned: usize, has_next_page: Option<bool>) -> bool {
        returned > 0 && has_next_page.unwrap_or(returned >= self.page_size)
    }
}

impl GalaxyApi for EliteBgsClient {
    async fn presence_page(&self, faction: &str, page: u32) -> Result<Page<String>, UpstreamError> {
        let query = [("faction", faction.to_string()), ("page", page.to_string())];
        let docs: PagedDocs<WireSystem> = self.get_page("presence", &query).await?;
        let has_more = self.has_more(docs.docs.len(), docs.has_next_page);
        tracing::debug!(faction, page, returned = docs.docs.len(), "Presence page");
        Ok(Page {
            items: docs.docs.into_iter().map(|s| s.name).collect(),
            has_more,
        })
    }

    async fn systems_page(
        &self,
        names: &[String],
        page: u32,
    ) -> Result<Page<SystemRecord>, UpstreamError> {
        let mut query: Vec<(&str, String)> = names.iter().map(|n| ("name", n.clone())).collect();
        query.push(("page", page.to_string()));
        let docs: PagedDocs<WireSystem> = self.get_page("systems", &query).await?;
        let has_more = self.has_more(docs.docs.len(), docs.has_next_page);
        tracing::debug!(
            requested = names.len(),
            page,
            returned = docs.docs.len(),
            "System lookup page"
        );
        Ok(Page {
            items: docs.docs.into_iter().map(SystemRecord::from).collect(),
            has_more,
        })
    }
}
