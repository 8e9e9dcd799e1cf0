//! Business rules applied after the solver.
//!
//! Every rule is a plain function taking the predictions by value and
//! returning the adjusted predictions. Rules run in a fixed order and later
//! rules override earlier ones. Collision resolution always runs last.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::furniture::{Face, FurnitureDimensions, FurnitureType};
use crate::grid::GridShape;
use crate::types::{PlanogramError, Product, Result, Season};

mod collision;
mod rules;
mod validation;
#[cfg(test)]
mod tests;

pub use collision::resolve_collisions;
pub use rules::{
    apply_dimension_limits, apply_face_validity, apply_legal, apply_merchandising,
    apply_packaging, apply_seasonal, apply_store_surface, apply_supplier, apply_temperature,
    apply_zone,
};
pub use validation::{check_constraints, ConstraintViolation, ViolationKind};

/// Position and fixture of one product, as rewritten by the rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedRow {
    pub product_id: String,
    pub furniture: FurnitureType,
    pub dimensions: FurnitureDimensions,
    #[serde(default)]
    pub face: Face,
    /// 1-based; may be out of range until collisions are resolved
    pub shelf: i64,
    /// 1-based; may be out of range until collisions are resolved
    pub column: i64,
    pub quantity: u32,
}

impl PredictedRow {
    /// Moves the product to another fixture and keeps its face valid there.
    pub fn reassign_furniture(&mut self, furniture: FurnitureType) {
        self.furniture = furniture;
        if !furniture.offers_face(self.face) {
            self.face = furniture.available_faces()[0];
        }
    }
}

/// Everything the rules transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub grid: GridShape,
    pub rows: Vec<PredictedRow>,
}

fn default_eye_level_top() -> u32 {
    3
}

fn default_eye_level_bottom() -> u32 {
    4
}

fn default_eye_level_shelf() -> u32 {
    3
}

fn default_high_shelf_limit() -> u32 {
    2
}

fn default_low_visibility_shelf() -> u32 {
    4
}

fn default_fragile_max_quantity() -> u32 {
    3
}

fn default_high_priority_threshold() -> u8 {
    8
}

fn default_low_priority_threshold() -> u8 {
    3
}

fn default_high_priority_min_quantity() -> u32 {
    5
}

fn default_small_store_surface() -> f64 {
    300.0
}

fn default_large_store_surface() -> f64 {
    800.0
}

fn default_compact_width() -> f64 {
    100.0
}

fn default_compact_height() -> f64 {
    180.0
}

fn default_imposing_width() -> f64 {
    150.0
}

fn default_imposing_height() -> f64 {
    200.0
}

/// Shelf bands and thresholds used by the rules. Shelf numbers are clamped
/// to the grid when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Highest shelf of the eye-level band required by suppliers
    #[serde(default = "default_eye_level_top")]
    pub eye_level_top: u32,
    /// Lowest shelf of the eye-level band required by suppliers
    #[serde(default = "default_eye_level_bottom")]
    pub eye_level_bottom: u32,
    /// Shelf given to seasonal, entrance and high priority products
    #[serde(default = "default_eye_level_shelf")]
    pub eye_level_shelf: u32,
    /// Age-restricted products sit on this shelf or above
    #[serde(default = "default_high_shelf_limit")]
    pub high_shelf_limit: u32,
    /// Low priority products sit on this shelf or below
    #[serde(default = "default_low_visibility_shelf")]
    pub low_visibility_shelf: u32,
    #[serde(default = "default_fragile_max_quantity")]
    pub fragile_max_quantity: u32,
    #[serde(default = "default_high_priority_threshold")]
    pub high_priority_threshold: u8,
    #[serde(default = "default_low_priority_threshold")]
    pub low_priority_threshold: u8,
    #[serde(default = "default_high_priority_min_quantity")]
    pub high_priority_min_quantity: u32,
    #[serde(default = "default_small_store_surface")]
    pub small_store_surface: f64,
    #[serde(default = "default_large_store_surface")]
    pub large_store_surface: f64,
    #[serde(default = "default_compact_width")]
    pub compact_width: f64,
    #[serde(default = "default_compact_height")]
    pub compact_height: f64,
    #[serde(default = "default_imposing_width")]
    pub imposing_width: f64,
    #[serde(default = "default_imposing_height")]
    pub imposing_height: f64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            eye_level_top: default_eye_level_top(),
            eye_level_bottom: default_eye_level_bottom(),
            eye_level_shelf: default_eye_level_shelf(),
            high_shelf_limit: default_high_shelf_limit(),
            low_visibility_shelf: default_low_visibility_shelf(),
            fragile_max_quantity: default_fragile_max_quantity(),
            high_priority_threshold: default_high_priority_threshold(),
            low_priority_threshold: default_low_priority_threshold(),
            high_priority_min_quantity: default_high_priority_min_quantity(),
            small_store_surface: default_small_store_surface(),
            large_store_surface: default_large_store_surface(),
            compact_width: default_compact_width(),
            compact_height: default_compact_height(),
            imposing_width: default_imposing_width(),
            imposing_height: default_imposing_height(),
        }
    }
}

impl RuleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.eye_level_top < 1 || self.eye_level_top > self.eye_level_bottom {
            return Err(PlanogramError::InvalidInput(format!(
                "eye-level band {}-{} is empty",
                self.eye_level_top, self.eye_level_bottom
            )));
        }

        if self.low_priority_threshold >= self.high_priority_threshold {
            return Err(PlanogramError::InvalidInput(format!(
                "low priority threshold {} must be below high priority threshold {}",
                self.low_priority_threshold, self.high_priority_threshold
            )));
        }

        if self.small_store_surface > self.large_store_surface {
            return Err(PlanogramError::InvalidInput(format!(
                "small store surface {} exceeds large store surface {}",
                self.small_store_surface, self.large_store_surface
            )));
        }

        Ok(())
    }

    /// Eye-level band clamped to the grid, top shelf first.
    pub(crate) fn eye_level_band(&self, grid: &GridShape) -> (i64, i64) {
        (
            clamp_shelf(self.eye_level_top, grid),
            clamp_shelf(self.eye_level_bottom, grid),
        )
    }
}

/// Shelf number clamped into `1..=grid.shelves`.
pub(crate) fn clamp_shelf(shelf: u32, grid: &GridShape) -> i64 {
    i64::from(shelf.clamp(1, grid.shelves.max(1)))
}

/// Inputs the rules read besides the predictions
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    products: HashMap<&'a str, &'a Product>,
    pub store_surface: Option<f64>,
    pub season: Season,
    pub settings: &'a RuleSettings,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        products: &'a [Product],
        store_surface: Option<f64>,
        season: Season,
        settings: &'a RuleSettings,
    ) -> Self {
        Self {
            products: products.iter().map(|p| (p.id.as_str(), p)).collect(),
            store_surface,
            season,
            settings,
        }
    }

    /// Input row of a product; rules skip rows without one.
    pub fn product(&self, id: &str) -> Option<&'a Product> {
        self.products.get(id).copied()
    }
}

/// A business rule
pub type Rule = fn(Predictions, &RuleContext<'_>) -> Predictions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Temperature,
    FaceValidity,
    DimensionLimits,
    Supplier,
    Packaging,
    Legal,
    Seasonal,
    Zone,
    Merchandising,
    StoreSurface,
}

/// Rules in application order
pub const PIPELINE: [(RuleKind, Rule); 10] = [
    (RuleKind::Temperature, apply_temperature),
    (RuleKind::FaceValidity, apply_face_validity),
    (RuleKind::DimensionLimits, apply_dimension_limits),
    (RuleKind::Supplier, apply_supplier),
    (RuleKind::Packaging, apply_packaging),
    (RuleKind::Legal, apply_legal),
    (RuleKind::Seasonal, apply_seasonal),
    (RuleKind::Zone, apply_zone),
    (RuleKind::Merchandising, apply_merchandising),
    (RuleKind::StoreSurface, apply_store_surface),
];

/// Description of a rule for catalogs and help output
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub rule: RuleKind,
    pub description: &'static str,
    pub inputs: &'static [&'static str],
    pub actions: &'static [&'static str],
}

impl RuleKind {
    pub fn rule(self) -> Rule {
        match self {
            RuleKind::Temperature => apply_temperature,
            RuleKind::FaceValidity => apply_face_validity,
            RuleKind::DimensionLimits => apply_dimension_limits,
            RuleKind::Supplier => apply_supplier,
            RuleKind::Packaging => apply_packaging,
            RuleKind::Legal => apply_legal,
            RuleKind::Seasonal => apply_seasonal,
            RuleKind::Zone => apply_zone,
            RuleKind::Merchandising => apply_merchandising,
            RuleKind::StoreSurface => apply_store_surface,
        }
    }

    pub fn info(self) -> RuleInfo {
        let (description, inputs, actions): (&str, &[&str], &[&str]) = match self {
            RuleKind::Temperature => (
                "Cold products go on refrigerated furniture",
                &["temperature"],
                &["non refrigerated furniture -> refrigerator"],
            ),
            RuleKind::FaceValidity => (
                "Faces must exist on the furniture (1, 2 or 4 faces)",
                &["furniture", "face"],
                &["invalid face -> first valid face"],
            ),
            RuleKind::DimensionLimits => (
                "Furniture dimensions stay within min/max limits",
                &["dimensions"],
                &["clip width, height, depth, shelf and column counts"],
            ),
            RuleKind::Supplier => (
                "Placement required by the supplier",
                &["supplier_placement"],
                &["head_of_gondola -> column 1", "eye_level -> eye-level band"],
            ),
            RuleKind::Packaging => (
                "Packaging constraints",
                &["packaging"],
                &["fragile -> capped quantity", "liquid -> low shelves"],
            ),
            RuleKind::Legal => (
                "Legal restrictions",
                &["legal"],
                &["age -> high shelves", "licence -> back face"],
            ),
            RuleKind::Seasonal => (
                "Products of the current season get premium slots",
                &["season"],
                &["front face, eye-level shelf, central column"],
            ),
            RuleKind::Zone => (
                "Store zone of the fixture",
                &["zone_temperature", "zone_location"],
                &["cold zone -> refrigerator", "entrance -> front face, eye-level shelf"],
            ),
            RuleKind::Merchandising => (
                "Merchandising priority",
                &["merchandising_priority"],
                &[
                    "high priority -> front, eye level, central, more stock",
                    "low priority -> back face, low shelves",
                ],
            ),
            RuleKind::StoreSurface => (
                "Furniture size follows the store surface",
                &["store_surface_m2"],
                &["small store -> compact furniture", "large store -> imposing furniture"],
            ),
        };

        RuleInfo {
            rule: self,
            description,
            inputs,
            actions,
        }
    }
}

/// Catalog of every rule in application order.
pub fn rule_catalog() -> Vec<RuleInfo> {
    PIPELINE.iter().map(|(kind, _)| kind.info()).collect()
}

/// Runs every rule in order, without collision resolution.
pub fn apply_rules(predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    PIPELINE
        .iter()
        .fold(predictions, |predictions, (kind, rule)| {
            debug!("Applying {:?} rule", kind);
            rule(predictions, ctx)
        })
}

/// Runs every rule, then moves colliding or out of range products to free
/// slots the rules accept. Running it again on its own output changes nothing
/// as long as every relocated product found such a slot.
pub fn apply_constraints(predictions: Predictions, ctx: &RuleContext<'_>) -> Result<Predictions> {
    resolve_collisions(apply_rules(predictions, ctx), ctx)
}
