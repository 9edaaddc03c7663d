// System data fetching: coordinates and controlling faction for resolved names.

use futures::future::try_join_all;

use crate::config::UpstreamConfig;
use crate::error::{FetchStage, MapError, UpstreamError};
use crate::metrics;
use crate::model::{FactionSystemSet, StarSystem, SystemRecord};
use crate::presence::resolve_presence;
use crate::upstream::GalaxyApi;

/// Look up every name in batches of `batch_size`, running batches concurrently.
///
/// Names the upstream does not know, and records without usable coordinates,
/// are dropped. Any batch failure fails the whole fetch.
pub async fn fetch_systems<A: GalaxyApi>(
    api: &A,
    faction: &str,
    names: &[String],
    limits: &UpstreamConfig,
) -> Result<Vec<StarSystem>, MapError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let batches = names
        .chunks(limits.batch_size.max(1))
        .map(|batch| fetch_batch(api, batch, limits.max_pages));
    let records: Vec<SystemRecord> = try_join_all(batches)
        .await
        .map_err(|source| MapError::UpstreamFetch {
            stage: FetchStage::Systems,
            faction: faction.to_string(),
            source,
        })?
        .into_iter()
        .flatten()
        .collect();

    let returned = records.len();
    let systems: Vec<StarSystem> = records
        .into_iter()
        .filter_map(|record| {
            let name = record.name.clone();
            let parsed = StarSystem::from_record(record);
            if parsed.is_none() {
                tracing::debug!(system = %name, "Dropping system without coordinates");
            }
            parsed
        })
        .collect();

    tracing::debug!(
        faction,
        requested = names.len(),
        returned,
        usable = systems.len(),
        "Fetched system data"
    );
    Ok(systems)
}

async fn fetch_batch<A: GalaxyApi>(
    api: &A,
    batch: &[String],
    max_pages: u32,
) -> Result<Vec<SystemRecord>, UpstreamError> {
    let mut records = Vec::new();
    let mut page = 1;
    loop {
        let result = api.systems_page(batch, page).await?;
        records.extend(result.items);
        if !result.has_more {
            break;
        }
        if page >= max_pages {
            tracing::warn!(
                requested = batch.len(),
                page,
                "System lookup pagination stopped at page limit"
            );
            break;
        }
        page += 1;
    }
    Ok(records)
}

/// Resolve a faction's presence, then fetch its systems into a set.
pub async fn build_faction_set<A: GalaxyApi>(
    api: &A,
    faction: &str,
    limits: &UpstreamConfig,
) -> Result<FactionSystemSet, MapError> {
    let names = resolve_presence(api, faction, limits).await?;
    let systems = fetch_systems(api, faction, &names, limits).await?;
    metrics::SYSTEMS_RESOLVED_TOTAL.inc_by(systems.len() as u64);
    Ok(FactionSystemSet::new(faction, systems))
}
