use planogram_core::{
    apply_constraints, check_constraints, rule_catalog, ConstraintViolation, PlanogramRequest,
    PlanogramResult, Planner, Predictions, Product, Result, RuleContext, RuleInfo, RuleSettings,
    Season, ShelfZoneMap,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ApiConfig;

/// Predictions to run through the business rules
#[derive(Debug, Deserialize)]
pub struct ConstraintRequest {
    pub predictions: Predictions,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub store_surface_m2: Option<f64>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub rules: Option<RuleSettings>,
}

#[derive(Debug, Serialize)]
pub struct ConstraintResponse {
    pub predictions: Predictions,
    pub violations: Vec<ConstraintViolation>,
}

/// Shared, read-only state of the server. Every request builds its own
/// planner from it.
#[derive(Debug, Clone, Default)]
pub struct PlanogramService {
    season: Option<Season>,
    rules: RuleSettings,
}

impl PlanogramService {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            season: config.season,
            rules: config.rules.clone(),
        }
    }

    fn season(&self, requested: Option<Season>) -> Season {
        requested.or(self.season).unwrap_or_else(Season::current)
    }

    pub fn plan(&self, mut request: PlanogramRequest) -> Result<PlanogramResult> {
        info!(
            "Planogram request: {} products on {} shelves x {} columns",
            request.products.len(),
            request.shelf_count,
            request.column_count
        );

        request.season = Some(self.season(request.season));
        let result = Planner::new(request)?.plan()?;

        info!(
            "Placed {} products, {} violations",
            result.placements.len(),
            result.violations.len()
        );
        Ok(result)
    }

    pub fn apply_constraints(&self, request: ConstraintRequest) -> Result<ConstraintResponse> {
        let rules = request.rules.unwrap_or_else(|| self.rules.clone());
        rules.validate()?;
        request.predictions.grid.validate()?;
        for product in &request.products {
            product.validate()?;
        }

        let ctx = RuleContext::new(
            &request.products,
            request.store_surface_m2,
            self.season(request.season),
            &rules,
        );
        let predictions = apply_constraints(request.predictions, &ctx)?;
        let violations = check_constraints(&predictions, &ctx);

        info!(
            "Constraints applied to {} rows, {} violations",
            predictions.rows.len(),
            violations.len()
        );
        Ok(ConstraintResponse {
            predictions,
            violations,
        })
    }

    pub fn rules(&self) -> Vec<RuleInfo> {
        rule_catalog()
    }

    pub fn zones(
        &self,
        shelf_count: u32,
        total_height: f64,
        children_target: bool,
    ) -> Result<ShelfZoneMap> {
        ShelfZoneMap::calculate(shelf_count, total_height, children_target)
    }
}
