use std::collections::HashSet;
use tracing::{debug, info};

use crate::constraints::{
    apply_constraints, check_constraints, ConstraintViolation, PredictedRow, Predictions,
    RuleContext,
};
use crate::furniture::Face;
use crate::grid::GridShape;
use crate::scoring::{ranking, score_products, ProductScore};
use crate::types::*;
use crate::zones::ShelfZoneMap;

mod spillover;
mod summary;

pub use spillover::shelf_search_order;

/// Places products on a fixture by score, then runs the business rules.
pub struct Planner {
    request: PlanogramRequest,
    shape: GridShape,
    zones: ShelfZoneMap,
    season: Season,
}

impl Planner {
    /// Validates the request, applies the product selection and checks that
    /// every selected product fits on the fixture.
    pub fn new(mut request: PlanogramRequest) -> Result<Self> {
        let shape = GridShape::new(
            request.shelf_count,
            request.column_count,
            request.furniture.faces(),
        )?;
        let zones = ShelfZoneMap::calculate(
            request.shelf_count,
            request.total_height,
            request.children_target,
        )?;

        if let Some(boost) = &request.promotion_boost {
            if !boost.boost_factor.is_finite() || boost.boost_factor <= 0.0 {
                return Err(PlanogramError::InvalidInput(format!(
                    "boost_factor must be a positive number, got {}",
                    boost.boost_factor
                )));
            }
        }

        if request.default_quantity < 1 {
            return Err(PlanogramError::InvalidInput(
                "default_quantity must be at least 1".to_string(),
            ));
        }

        request.rules.validate()?;

        if request.products.is_empty() {
            return Err(PlanogramError::InvalidInput(
                "At least one product must be provided".to_string(),
            ));
        }

        if !request.selection.is_empty() {
            let before = request.products.len();
            let products = std::mem::take(&mut request.products);
            request.products = request.selection.apply(products);
            debug!("Selection kept {} of {} products", request.products.len(), before);

            if request.products.is_empty() {
                return Err(PlanogramError::InvalidInput(
                    "The product selection matches no product".to_string(),
                ));
            }
        }

        let mut ids = HashSet::new();
        for product in &request.products {
            product.validate()?;
            if !ids.insert(product.id.as_str()) {
                return Err(PlanogramError::InvalidInput(format!(
                    "Duplicate product id '{}'",
                    product.id
                )));
            }
        }

        if request.products.len() > shape.capacity() {
            return Err(PlanogramError::Capacity {
                products: request.products.len(),
                cells: shape.capacity(),
            });
        }

        let season = request.season.unwrap_or_else(Season::current);

        Ok(Self {
            request,
            shape,
            zones,
            season,
        })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn zones(&self) -> &ShelfZoneMap {
        &self.zones
    }

    /// Products left after selection, in input order.
    pub fn products(&self) -> &[Product] {
        &self.request.products
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Runs the full placement: scoring, grid filling, business rules and
    /// collision resolution.
    pub fn plan(&self) -> Result<PlanogramResult> {
        let products = &self.request.products;
        let scores = score_products(products, self.request.promotion_boost.as_ref());
        let order = ranking(&scores);

        let slots = self.fill_grid(&scores, &order)?;
        info!(
            "Placed {} products on a {}x{} {} ({} faces)",
            products.len(),
            self.shape.shelves,
            self.shape.columns,
            self.request.furniture,
            self.shape.faces
        );

        let predictions = self.predictions(&slots);
        let ctx = RuleContext::new(
            products,
            self.request.store_surface_m2,
            self.season,
            &self.request.rules,
        );
        let predictions = apply_constraints(predictions, &ctx)?;
        let violations = check_constraints(&predictions, &ctx);
        if !violations.is_empty() {
            debug!("{} constraint violations remain", violations.len());
        }

        Ok(self.build_result(predictions, &scores, violations))
    }

    /// Rows in product order, at the slots chosen by the solver.
    fn predictions(&self, slots: &[Slot]) -> Predictions {
        let rows = self
            .request
            .products
            .iter()
            .zip(slots)
            .map(|(product, slot)| PredictedRow {
                product_id: product.id.clone(),
                furniture: self.request.furniture,
                dimensions: self.request.dimensions.clone(),
                face: slot.face,
                shelf: i64::from(slot.shelf),
                column: i64::from(slot.column),
                quantity: self.request.default_quantity,
            })
            .collect();

        Predictions {
            grid: self.shape,
            rows,
        }
    }

    fn build_result(
        &self,
        predictions: Predictions,
        scores: &[ProductScore],
        violations: Vec<ConstraintViolation>,
    ) -> PlanogramResult {
        let dimensions = predictions
            .rows
            .first()
            .map(|row| row.dimensions.clone())
            .unwrap_or_else(|| self.request.dimensions.clone());

        let placements = self.build_placements(&predictions, scores);
        let shelves = self.shelf_summaries(&placements);

        PlanogramResult {
            shelf_count: self.shape.shelves,
            column_count: self.shape.columns,
            furniture: self.request.furniture,
            dimensions,
            placements,
            visibility_map: self.zones.visibility_map(),
            zone_map: self.zones.zone_map(),
            shelves,
            violations,
        }
    }
}

/// Slot picked by the solver for one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    face: Face,
    shelf: u32,
    column: u32,
}
