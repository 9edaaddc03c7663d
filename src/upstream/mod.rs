// Upstream galaxy data services.
//
// `GalaxyApi` is the seam between the pipeline and the network. The HTTP client
// talks to an EliteBGS-style service; the in-memory implementation serves a
// fixed dataset for offline runs and tests.

pub mod http;
pub mod memory;

use std::future::Future;

use crate::error::UpstreamError;
use crate::model::SystemRecord;

pub use http::EliteBgsClient;
pub use memory::InMemoryGalaxy;

/// One page of results. Page cursors start at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

/// Paginated access to faction presence and system data.
pub trait GalaxyApi: Send + Sync {
    /// Names of systems where `faction` has presence. The name is matched exactly.
    fn presence_page(
        &self,
        faction: &str,
        page: u32,
    ) -> impl Future<Output = Result<Page<String>, UpstreamError>> + Send;

    /// Records for the named systems. Unknown names are simply absent.
    fn systems_page(
        &self,
        names: &[String],
        page: u32,
    ) -> impl Future<Output = Result<Page<SystemRecord>, UpstreamError>> + Send;
}

/// Runtime choice between the live service and a fixture dataset.
pub enum Galaxy {
    Http(EliteBgsClient),
    Fixture(InMemoryGalaxy),
}

impl GalaxyApi for Galaxy {
    async fn presence_page(&self, faction: &str, page: u32) -> Result<Page<String>, UpstreamError> {
        match self {
            Galaxy::Http(client) => client.presence_page(faction, page).await,
            Galaxy::Fixture(data) => data.presence_page(faction, page).await,
        }
    }

    async fn systems_page(
        &self,
        names: &[String],
        page: u32,
    ) -> Result<Page<SystemRecord>, UpstreamError> {
        match self {
            Galaxy::Http(client) => client.systems_page(names, page).await,
            Galaxy::Fixture(data) => data.systems_page(names, page).await,
        }
    }
}
