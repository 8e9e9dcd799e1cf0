//! Planogram placement engine.
//!
//! Scores products, places them on a shelf grid by score and applies the
//! business rules of the store before resolving collisions.

pub mod constraints;
pub mod furniture;
pub mod grid;
pub mod planner;
pub mod scoring;
pub mod selection;
pub mod types;
pub mod zones;

pub use constraints::{
    apply_constraints, apply_rules, check_constraints, rule_catalog, ConstraintViolation,
    PredictedRow, Predictions, RuleContext, RuleInfo, RuleKind, RuleSettings, ViolationKind,
};
pub use furniture::{Face, FurnitureDimensions, FurnitureType};
pub use grid::{GridShape, MAX_CELLS, MAX_COLUMNS, MAX_SHELVES};
pub use planner::Planner;
pub use scoring::PromotionBoost;
pub use selection::ProductSelection;
pub use types::*;
pub use zones::{CommercialZone, ShelfZone, ShelfZoneMap, VisibilityLevel};
