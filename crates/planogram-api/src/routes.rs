use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use planogram_core::{PlanogramError, PlanogramRequest, PlanogramResult, RuleInfo, ShelfZoneMap};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::service::{ConstraintRequest, ConstraintResponse, PlanogramService};

type AppState = Arc<PlanogramService>;

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/planogram", post(planogram))
        .route("/api/constraints", get(constraints))
        .route("/api/constraints/apply", post(apply_constraints))
        .route("/api/zones", get(zones))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "planogram-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main placement endpoint
async fn planogram(
    State(service): State<AppState>,
    Json(request): Json<PlanogramRequest>,
) -> Result<Json<PlanogramResult>, AppError> {
    Ok(Json(service.plan(request)?))
}

async fn apply_constraints(
    State(service): State<AppState>,
    Json(request): Json<ConstraintRequest>,
) -> Result<Json<ConstraintResponse>, AppError> {
    Ok(Json(service.apply_constraints(request)?))
}

/// Rule catalog
async fn constraints(State(service): State<AppState>) -> Json<Vec<RuleInfo>> {
    Json(service.rules())
}

fn default_total_height() -> f64 {
    200.0
}

#[derive(Debug, Deserialize)]
struct ZonesQuery {
    shelf_count: u32,
    #[serde(default = "default_total_height")]
    total_height: f64,
    #[serde(default)]
    children_target: bool,
}

async fn zones(
    State(service): State<AppState>,
    Query(query): Query<ZonesQuery>,
) -> Result<Json<ShelfZoneMap>, AppError> {
    info!(
        "Zone table for {} shelves, {} cm",
        query.shelf_count, query.total_height
    );
    let map = service.zones(query.shelf_count, query.total_height, query.children_target)?;
    Ok(Json(map))
}

/// Application error type
struct AppError(anyhow::Error);

impl From<PlanogramError> for AppError {
    fn from(err: PlanogramError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {}", self.0);

        let status = match self.0.downcast_ref::<PlanogramError>() {
            Some(
                PlanogramError::Capacity { .. }
                | PlanogramError::MalformedGrid(_)
                | PlanogramError::InvalidInput(_),
            ) => StatusCode::BAD_REQUEST,
            Some(PlanogramError::PlacementImpossible { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(json!({
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}
