//! Shelf zones and score segments.
//!
//! Shelf 1 is the physically topmost shelf. Heights are in cm.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::grid::MAX_SHELVES;
use crate::types::{PlanogramError, Result};

/// How visible a shelf is to a standing customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityLevel {
    EyeLevel,
    BelowEye,
    AboveEye,
    LowLevel,
}

/// Commercial classification of a shelf height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommercialZone {
    GoldenZone,
    EyeLevel,
    HandLevel,
    HighZone,
    LowZone,
    VeryLowZone,
}

impl CommercialZone {
    pub fn visibility(self) -> VisibilityLevel {
        match self {
            CommercialZone::EyeLevel => VisibilityLevel::EyeLevel,
            CommercialZone::HandLevel => VisibilityLevel::BelowEye,
            CommercialZone::HighZone => VisibilityLevel::AboveEye,
            _ => VisibilityLevel::LowLevel,
        }
    }
}

/// Height thresholds of the golden zone for one audience
struct GoldenZone {
    bottom: f64,
    eye_level: f64,
    top: f64,
}

const ADULT_GOLDEN_ZONE: GoldenZone = GoldenZone {
    bottom: 90.0,
    eye_level: 120.0,
    top: 160.0,
};

const CHILD_GOLDEN_ZONE: GoldenZone = GoldenZone {
    bottom: 70.0,
    eye_level: 100.0,
    top: 130.0,
};

const LOW_ZONE_FLOOR: f64 = 40.0;
const REACH_LIMIT: f64 = 200.0;

/// Classifies the mid height of a shelf.
pub fn commercial_zone(mid_height: f64, children_target: bool) -> CommercialZone {
    let golden = if children_target {
        &CHILD_GOLDEN_ZONE
    } else {
        &ADULT_GOLDEN_ZONE
    };

    if mid_height >= golden.bottom && mid_height <= golden.top {
        if mid_height >= golden.eye_level {
            CommercialZone::EyeLevel
        } else {
            CommercialZone::HandLevel
        }
    } else if mid_height < golden.bottom {
        if mid_height < LOW_ZONE_FLOOR {
            CommercialZone::VeryLowZone
        } else {
            CommercialZone::LowZone
        }
    } else if mid_height > REACH_LIMIT {
        // Out of reach
        CommercialZone::VeryLowZone
    } else {
        CommercialZone::HighZone
    }
}

/// Height band and classification of one shelf
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShelfZone {
    pub shelf: u32,
    pub bottom: f64,
    pub top: f64,
    pub mid: f64,
    pub visibility: VisibilityLevel,
    pub commercial_zone: CommercialZone,
}

/// Zones of every shelf of a fixture, computed once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfZoneMap {
    pub shelf_count: u32,
    pub total_height: f64,
    pub children_target: bool,
    pub zones: Vec<ShelfZone>,
}

impl ShelfZoneMap {
    pub fn calculate(shelf_count: u32, total_height: f64, children_target: bool) -> Result<Self> {
        if shelf_count < 1 {
            return Err(PlanogramError::MalformedGrid(
                "shelf_count must be at least 1".to_string(),
            ));
        }

        if shelf_count > MAX_SHELVES {
            return Err(PlanogramError::MalformedGrid(format!(
                "shelf_count {} exceeds the maximum of {}",
                shelf_count, MAX_SHELVES
            )));
        }

        if !total_height.is_finite() || total_height <= 0.0 {
            return Err(PlanogramError::InvalidInput(format!(
                "total_height must be a positive number of cm, got {}",
                total_height
            )));
        }

        let shelf_height = total_height / f64::from(shelf_count);
        let zones = (1..=shelf_count)
            .map(|shelf| {
                let bottom = total_height - f64::from(shelf) * shelf_height;
                let top = bottom + shelf_height;
                let mid = (bottom + top) / 2.0;
                let commercial_zone = commercial_zone(mid, children_target);

                ShelfZone {
                    shelf,
                    bottom,
                    top,
                    mid,
                    visibility: commercial_zone.visibility(),
                    commercial_zone,
                }
            })
            .collect();

        Ok(Self {
            shelf_count,
            total_height,
            children_target,
            zones,
        })
    }

    /// Zone of a 1-based shelf; out of range shelves map to the nearest one.
    pub fn shelf(&self, shelf: u32) -> &ShelfZone {
        let index = shelf.clamp(1, self.shelf_count) - 1;
        &self.zones[index as usize]
    }

    pub fn visibility_map(&self) -> BTreeMap<u32, VisibilityLevel> {
        self.zones.iter().map(|z| (z.shelf, z.visibility)).collect()
    }

    pub fn zone_map(&self) -> BTreeMap<u32, CommercialZone> {
        self.zones
            .iter()
            .map(|z| (z.shelf, z.commercial_zone))
            .collect()
    }
}

/// Target shelf for an adjusted score. Higher scores land on lower shelf
/// indices, i.e. physically higher.
pub fn shelf_for_score(score: f64, shelf_count: u32) -> u32 {
    match shelf_count {
        0 | 1 => 1,
        2..=4 => {
            let segment_size = 1.0 / f64::from(shelf_count);
            let segment = (score / segment_size).floor().max(0.0) as u32;
            shelf_count - segment.min(shelf_count - 1)
        }
        _ => {
            let shelf = if score <= 0.2 {
                5
            } else if score <= 0.4 {
                4
            } else if score <= 0.6 {
                3
            } else if score <= 0.8 {
                2
            } else {
                1
            };
            shelf.min(shelf_count)
        }
    }
}
