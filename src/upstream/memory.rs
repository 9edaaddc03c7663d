// Fixed galaxy dataset served from memory, paginated like the live service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use super::{GalaxyApi, Page};
use crate::error::UpstreamError;
use crate::model::SystemRecord;

/// On-disk fixture layout.
#[derive(Debug, Deserialize)]
pub struct GalaxyFixture {
    /// Faction name -> names of systems it has presence in.
    pub factions: HashMap<String, Vec<String>>,
    pub systems: Vec<SystemRecord>,
}

/// In-memory `GalaxyApi`. Counts requests so callers can see what was fetched.
pub struct InMemoryGalaxy {
    presence: HashMap<String, Vec<String>>,
    systems: HashMap<String, SystemRecord>,
    page_size: usize,
    presence_requests: AtomicUsize,
    system_requests: AtomicUsize,
}

impl InMemoryGalaxy {
    pub fn new(page_size: usize) -> Self {
        Self {
            presence: HashMap::new(),
            systems: HashMap::new(),
            page_size: page_size.max(1),
            presence_requests: AtomicUsize::new(0),
            system_requests: AtomicUsize::new(0),
        }
    }

    /// Load a fixture file (see `GalaxyFixture`).
    pub fn from_fixture_file(path: &Path, page_size: usize) -> Result<Self, UpstreamError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| UpstreamError::Transport(format!("{}: {e}", path.display())))?;
        let fixture: GalaxyFixture =
            serde_json::from_str(&raw).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(Self::from_fixture(fixture, page_size))
    }

    pub fn from_fixture(fixture: GalaxyFixture, page_size: usize) -> Self {
        let mut galaxy = Self::new(page_size);
        for record in fixture.systems {
            galaxy.insert_system(record);
        }
        for (faction, names) in fixture.factions {
            for name in names {
                galaxy.add_presence(&faction, &name);
            }
        }
        galaxy
    }

    pub fn insert_system(&mut self, record: SystemRecord) {
        self.systems.insert(record.name.clone(), record);
    }

    pub fn add_presence(&mut self, faction: &str, system: &str) {
        self.presence
            .entry(faction.to_string())
            .or_default()
            .push(system.to_string());
    }

    /// Convenience for building datasets in code: a located system with an
    /// optional controller, registered as a presence of `faction`.
    pub fn with_system(
        mut self,
        faction: &str,
        name: &str,
        (x, y, z): (f64, f64, f64),
        controlling_faction: Option<&str>,
    ) -> Self {
        self.insert_system(SystemRecord {
            name: name.to_string(),
            x: Some(x),
            y: Some(y),
            z: Some(z),
            controlling_faction: controlling_faction.map(str::to_string),
        });
        self.add_presence(faction, name);
        self
    }

    pub fn presence_requests(&self) -> usize {
        self.presence_requests.load(Ordering::Relaxed)
    }

    pub fn system_requests(&self) -> usize {
        self.system_requests.load(Ordering::Relaxed)
    }

    fn page_of<T: Clone>(&self, items: &[T], page: u32) -> Page<T> {
        let start = (page.max(1) as usize - 1) * self.page_size;
        let slice: Vec<T> = items
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let has_more = slice.len() >= self.page_size;
        Page {
            items: slice,
            has_more,
        }
    }
}

impl GalaxyApi for InMemoryGalaxy {
    async fn presence_page(&self, faction: &str, page: u32) -> Result<Page<String>, UpstreamError> {
        self.presence_requests.fetch_add(1, Ordering::Relaxed);
        let names = self.presence.get(faction).map(Vec::as_slice).unwrap_or(&[]);
        Ok(self.page_of(names, page))
    }

    async fn systems_page(
        &self,
        names: &[String],
        page: u32,
    ) -> Result<Page<SystemRecord>, UpstreamError> {
        self.system_requests.fetch_add(1, Ordering::Relaxed);
        let found: Vec<SystemRecord> = names
            .iter()
            .filter_map(|n| self.systems.get(n).cloned())
            .collect();
        Ok(self.page_of(&found, page))
    }
}
