use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------- Location context ----------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What the location provider last told us
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationStatus {
    #[default]
    Unknown,
    Available(Coordinates),
    PermissionDenied,
}

impl LocationStatus {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationStatus::Available(c) => Some(*c),
            _ => None,
        }
    }
}

// ---------- User-tunable constraints ----------

pub const DEFAULT_MAX_STORE_DISTANCE_KM: f64 = 10.0;
pub const DEFAULT_MAX_TRAVEL_DISTANCE_KM: f64 = 20.0;
pub const DEFAULT_MAX_STORES: u32 = 3;

/// Session-scoped search constraints; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSettings {
    pub max_store_distance_km: f64,
    pub max_travel_distance_km: f64,
    pub max_stores: u32,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            max_store_distance_km: DEFAULT_MAX_STORE_DISTANCE_KM,
            max_travel_distance_km: DEFAULT_MAX_TRAVEL_DISTANCE_KM,
            max_stores: DEFAULT_MAX_STORES,
        }
    }
}

// ---------- Search mode & priority ----------

/// At most one chip is active; `None` means no chip is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityChip {
    #[default]
    None,
    Distance,
    Cost,
}

impl PriorityChip {
    /// Selecting the active chip again deselects it
    pub fn toggled(self, chip: PriorityChip) -> PriorityChip {
        if self == chip {
            PriorityChip::None
        } else {
            chip
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationMode {
    #[default]
    SingleStore,
    MultiStore,
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationMode::SingleStore => f.write_str("single-store"),
            OptimizationMode::MultiStore => f.write_str("multi-store"),
        }
    }
}

impl fmt::Display for PriorityChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityChip::None => f.write_str("none"),
            PriorityChip::Distance => f.write_str("distance"),
            PriorityChip::Cost => f.write_str("cost"),
        }
    }
}

impl FromStr for OptimizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "single-store" => Ok(OptimizationMode::SingleStore),
            "multi" | "multi-store" => Ok(OptimizationMode::MultiStore),
            other => Err(format!("unknown mode '{other}' (expected single or multi)")),
        }
    }
}

impl FromStr for PriorityChip {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PriorityChip::None),
            "distance" => Ok(PriorityChip::Distance),
            "cost" => Ok(PriorityChip::Cost),
            other => Err(format!("unknown priority '{other}' (expected none, distance or cost)")),
        }
    }
}
