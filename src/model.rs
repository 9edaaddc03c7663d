// Core data types: star systems and per-faction system sets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Galactic coordinates in light years. `y` is height above the galactic plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Full 3D Euclidean distance.
    pub fn distance_to(&self, other: &Coords) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance projected onto the galactic (x/z) plane.
    pub fn planar_distance_to(&self, other: &Coords) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// A system record as delivered by an upstream service, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SystemRecord {
    pub name: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(default)]
    pub controlling_faction: Option<String>,
}

/// A resolved star system. Coordinates are always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarSystem {
    pub name: String,
    pub coords: Coords,
    pub controlling_faction: Option<String>,
}

impl StarSystem {
    pub fn new(name: impl Into<String>, coords: Coords, controlling_faction: Option<&str>) -> Self {
        Self {
            name: name.into(),
            coords,
            controlling_faction: controlling_faction.map(str::to_string),
        }
    }

    /// Validate an upstream record. Returns `None` when any coordinate is
    /// missing or not finite; a blank control label becomes `None`.
    pub fn from_record(record: SystemRecord) -> Option<Self> {
        let (x, y, z) = match (record.x, record.y, record.z) {
            (Some(x), Some(y), Some(z)) if x.is_finite() && y.is_finite() && z.is_finite() => {
                (x, y, z)
            }
            _ => return None,
        };
        let controlling_faction = record
            .controlling_faction
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        Some(Self {
            name: record.name,
            coords: Coords { x, y, z },
            controlling_faction,
        })
    }

    /// Whether `faction` is the controlling faction. Upstream services disagree
    /// on casing, so the comparison ignores ASCII case.
    pub fn is_controlled_by(&self, faction: &str) -> bool {
        self.controlling_faction
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(faction))
    }

    pub fn distance_to(&self, other: &StarSystem) -> f64 {
        self.coords.distance_to(&other.coords)
    }
}

/// Ordered, name-unique systems where one faction has presence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactionSystemSet {
    faction: String,
    systems: Vec<StarSystem>,
}

impl FactionSystemSet {
    /// Build a set, keeping the first occurrence of each system name.
    pub fn new(faction: impl Into<String>, systems: Vec<StarSystem>) -> Self {
        let mut seen = HashSet::new();
        let systems = systems
            .into_iter()
            .filter(|s| seen.insert(s.name.clone()))
            .collect();
        Self {
            faction: faction.into(),
            systems,
        }
    }

    pub fn faction(&self) -> &str {
        &self.faction
    }

    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.systems.iter().any(|s| s.name == name)
    }

    /// Systems this faction controls, in set order.
    pub fn controlled(&self) -> impl Iterator<Item = &StarSystem> {
        self.systems
            .iter()
            .filter(move |s| s.is_controlled_by(&self.faction))
    }

    pub fn is_controlled(&self, system: &StarSystem) -> bool {
        system.is_controlled_by(&self.faction)
    }
}
