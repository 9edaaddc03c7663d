// Presence resolution: every system a faction has any recorded presence in.

use std::collections::HashSet;

use crate::config::UpstreamConfig;
use crate::error::{FetchStage, MapError};
use crate::upstream::GalaxyApi;

/// Page through the presence query until a short page, returning unique
/// system names in first-seen order.
///
/// The faction name is passed through untouched; the upstream match is exact
/// and case-sensitive.
pub async fn resolve_presence<A: GalaxyApi>(
    api: &A,
    faction: &str,
    limits: &UpstreamConfig,
) -> Result<Vec<String>, MapError> {
    if faction.trim().is_empty() {
        return Err(MapError::InvalidInput(
            "Faction name must not be empty.".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    let mut page = 1;
    loop {
        let result = api
            .presence_page(faction, page)
            .await
            .map_err(|source| MapError::UpstreamFetch {
                stage: FetchStage::Presence,
                faction: faction.to_string(),
                source,
            })?;

        for name in result.items {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }

        if !result.has_more {
            break;
        }
        if page >= limits.max_pages {
            tracing::warn!(faction, page, "Presence pagination stopped at page limit");
            break;
        }
        page += 1;
    }

    if names.is_empty() {
        return Err(MapError::FactionNotFound {
            name: faction.to_string(),
        });
    }

    tracing::debug!(faction, systems = names.len(), pages = page, "Resolved presence");
    Ok(names)
}
