use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{clamp_shelf, Predictions, RuleContext};
use crate::types::Temperature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Bounds,
    Collision,
    Dimensions,
    Temperature,
    Face,
    Merchandising,
}

/// A constraint a row still breaks. Reported, never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    pub product_id: String,
    pub message: String,
}

impl ConstraintViolation {
    fn new(kind: ViolationKind, product_id: &str, message: String) -> Self {
        Self {
            kind,
            product_id: product_id.to_string(),
            message,
        }
    }
}

/// Lists every violation of the predictions, row by row.
pub fn check_constraints(
    predictions: &Predictions,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let grid = &predictions.grid;
    let (band_top, band_bottom) = ctx.settings.eye_level_band(grid);
    let eye_level = clamp_shelf(ctx.settings.eye_level_shelf, grid);
    let premium = band_top.min(eye_level)..=band_bottom.max(eye_level);

    let mut violations = Vec::new();
    let mut occupied: HashMap<_, &str> = HashMap::new();

    for row in &predictions.rows {
        let id = row.product_id.as_str();

        if !grid.contains(row.face, row.shelf, row.column) {
            violations.push(ConstraintViolation::new(
                ViolationKind::Bounds,
                id,
                format!(
                    "({:?}, shelf {}, column {}) is outside the {}x{} grid",
                    row.face, row.shelf, row.column, grid.shelves, grid.columns
                ),
            ));
        } else if let Some(other) = occupied.insert((row.face, row.shelf, row.column), id) {
            violations.push(ConstraintViolation::new(
                ViolationKind::Collision,
                id,
                format!(
                    "shares ({:?}, shelf {}, column {}) with {}",
                    row.face, row.shelf, row.column, other
                ),
            ));
        }

        for (field, value) in row.dimensions.out_of_range() {
            violations.push(ConstraintViolation::new(
                ViolationKind::Dimensions,
                id,
                format!("{} = {} is out of limits", field, value),
            ));
        }

        if !row.furniture.offers_face(row.face) {
            violations.push(ConstraintViolation::new(
                ViolationKind::Face,
                id,
                format!("{} has no {:?} face", row.furniture, row.face),
            ));
        }

        let Some(product) = ctx.product(id) else {
            continue;
        };

        if product.temperature == Some(Temperature::Cold) && !row.furniture.is_refrigerated() {
            violations.push(ConstraintViolation::new(
                ViolationKind::Temperature,
                id,
                format!("cold product on {}", row.furniture),
            ));
        }

        let high_priority = product
            .merchandising_priority
            .is_some_and(|p| p >= ctx.settings.high_priority_threshold);
        if high_priority && !premium.contains(&row.shelf) {
            violations.push(ConstraintViolation::new(
                ViolationKind::Merchandising,
                id,
                format!(
                    "high priority product on shelf {}, expected {}-{}",
                    row.shelf,
                    premium.start(),
                    premium.end()
                ),
            ));
        }
    }

    violations
}
