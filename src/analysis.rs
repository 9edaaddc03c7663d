// Proximity analysis between a primary faction and its rival.
//
// All-pairs comparison; faction sets are tens to low hundreds of systems, so
// no spatial index is needed.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::{AnalysisConfig, RivalScope};
use crate::model::{FactionSystemSet, StarSystem};

/// A primary system within range of a rival system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySystem {
    pub system: StarSystem,
    pub distance: f64,
}

/// Primary systems near one rival system, nearest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityMatch {
    pub rival_system: StarSystem,
    pub nearby: Vec<NearbySystem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityAnalysis {
    pub threshold_ly: f64,
    /// Primary systems that the rival is also present in.
    pub overlap_systems: Vec<StarSystem>,
    /// One entry per in-scope rival system with at least one primary system in range.
    pub nearby_map: Vec<ProximityMatch>,
}

impl ProximityAnalysis {
    pub fn is_overlap(&self, name: &str) -> bool {
        self.overlap_systems.iter().any(|s| s.name == name)
    }
}

pub fn analyze(
    primary: &FactionSystemSet,
    rival: &FactionSystemSet,
    config: &AnalysisConfig,
) -> ProximityAnalysis {
    let threshold = config.threshold_ly;

    let overlap_systems: Vec<StarSystem> = primary
        .systems()
        .iter()
        .filter(|s| rival.contains_name(&s.name))
        .cloned()
        .collect();
    let overlap_names: HashSet<&str> = overlap_systems.iter().map(|s| s.name.as_str()).collect();

    let nearby_map = rival
        .systems()
        .iter()
        .filter(|r| match config.rival_scope {
            RivalScope::AllPresence => true,
            RivalScope::Controlled => rival.is_controlled(r),
        })
        .filter(|r| !overlap_names.contains(r.name.as_str()))
        .filter_map(|r| {
            let mut nearby: Vec<NearbySystem> = primary
                .systems()
                .iter()
                .filter_map(|p| {
                    let distance = r.distance_to(p);
                    (distance <= threshold).then(|| NearbySystem {
                        system: p.clone(),
                        distance,
                    })
                })
                .collect();
            if nearby.is_empty() {
                return None;
            }
            // Stable: equal distances keep fetch order.
            nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            Some(ProximityMatch {
                rival_system: r.clone(),
                nearby,
            })
        })
        .collect();

    ProximityAnalysis {
        threshold_ly: threshold,
        overlap_systems,
        nearby_map,
    }
}

/// Whether `system` lies within `threshold` of any system `opposing` controls.
pub fn is_near_enemy(system: &StarSystem, opposing: &FactionSystemSet, threshold: f64) -> bool {
    opposing
        .controlled()
        .any(|enemy| system.distance_to(enemy) <= threshold)
}
