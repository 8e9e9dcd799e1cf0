use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constraints::{ConstraintViolation, RuleSettings};
use crate::furniture::{Face, FurnitureDimensions, FurnitureType};
use crate::scoring::PromotionBoost;
use crate::selection::ProductSelection;
use crate::zones::{CommercialZone, VisibilityLevel};

/// Temperature a product needs, or that a store zone provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Ambient,
    Cold,
}

/// Placement imposed by the supplier contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierPlacement {
    HeadOfGondola,
    EyeLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Packaging {
    Standard,
    Fragile,
    Liquid,
}

/// Legal restriction attached to a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalRestriction {
    /// Sale restricted by customer age (alcohol, tobacco, ...)
    Age,
    /// Product sold under a licence and kept in a dedicated area
    Licence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Maps a calendar month (1-12) onto its season bucket.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Season of the local system clock.
    pub fn current() -> Self {
        Self::from_month(chrono::Local::now().month())
    }
}

/// Location of the fixture inside the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneLocation {
    Entrance,
    Aisle,
    Checkout,
    BackStore,
}

/// Product row - one line of the product table fed to a placement run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub average_sales: Option<f64>,
    #[serde(default)]
    pub average_stock: Option<f64>,
    #[serde(default)]
    pub forecast_demand: Option<f64>,
    /// Promotion flag as delivered by the source table; only `1` counts as active
    #[serde(default)]
    pub promotion: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_placement: Option<SupplierPlacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<Packaging>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal: Option<LegalRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_location: Option<ZoneLocation>,
    /// Merchandising priority from 1 (lowest) to 10 (highest)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchandising_priority: Option<u8>,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_promoted(&self) -> bool {
        self.promotion == 1
    }

    /// Checks what the schema alone cannot: a non-blank id and a priority
    /// within 1..=10.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlanogramError::InvalidInput(
                "Every product needs a non-empty id".to_string(),
            ));
        }

        if let Some(priority) = self.merchandising_priority {
            if !(1..=10).contains(&priority) {
                return Err(PlanogramError::InvalidInput(format!(
                    "Product {}: merchandising_priority must be between 1 and 10, got {}",
                    self.id, priority
                )));
            }
        }

        Ok(())
    }
}

fn default_total_height() -> f64 {
    200.0
}

fn default_quantity() -> u32 {
    1
}

/// Input: what the caller provides for one placement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanogramRequest {
    pub products: Vec<Product>,
    pub shelf_count: u32,
    pub column_count: u32,
    /// Physical height of the fixture in cm, used for shelf zones
    #[serde(default = "default_total_height")]
    pub total_height: f64,
    /// Shifts the golden zone down to children's eye height
    #[serde(default)]
    pub children_target: bool,
    #[serde(default)]
    pub furniture: FurnitureType,
    #[serde(default)]
    pub dimensions: FurnitureDimensions,
    /// Sales surface of the store, drives the store-surface rule
    #[serde(default)]
    pub store_surface_m2: Option<f64>,
    #[serde(default)]
    pub promotion_boost: Option<PromotionBoost>,
    /// Units put on each slot before packaging and merchandising rules
    #[serde(default = "default_quantity")]
    pub default_quantity: u32,
    /// Overrides the season taken from the system clock
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub selection: ProductSelection,
    #[serde(default)]
    pub rules: RuleSettings,
}

impl PlanogramRequest {
    /// Request with every optional setting at its default.
    pub fn new(products: Vec<Product>, shelf_count: u32, column_count: u32) -> Self {
        Self {
            products,
            shelf_count,
            column_count,
            total_height: default_total_height(),
            children_target: false,
            furniture: FurnitureType::default(),
            dimensions: FurnitureDimensions::default(),
            store_surface_m2: None,
            promotion_boost: None,
            default_quantity: default_quantity(),
            season: None,
            selection: ProductSelection::default(),
            rules: RuleSettings::default(),
        }
    }
}

/// Final position of a product on the fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub product_id: String,
    pub category: String,
    pub supplier: String,
    /// 1-based, shelf 1 is the topmost shelf
    pub shelf: u32,
    /// 1-based
    pub column: u32,
    pub face: Face,
    pub quantity: u32,
    pub score: f64,
    pub adjusted_score: f64,
    pub visibility_level: VisibilityLevel,
    pub commercial_zone: CommercialZone,
    /// Mid height of the shelf in cm
    pub shelf_height: f64,
    pub furniture: FurnitureType,
    pub promotion: bool,
}

/// Per-shelf statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfSummary {
    pub shelf: u32,
    /// Mid height of the shelf in cm
    pub height: f64,
    pub product_count: usize,
    pub average_score: f64,
}

/// Output: what the planner returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanogramResult {
    pub shelf_count: u32,
    pub column_count: u32,
    pub furniture: FurnitureType,
    /// Fixture dimensions after clipping and store-surface adjustment
    pub dimensions: FurnitureDimensions,
    pub placements: Vec<Placement>,
    pub visibility_map: BTreeMap<u32, VisibilityLevel>,
    pub zone_map: BTreeMap<u32, CommercialZone>,
    pub shelves: Vec<ShelfSummary>,
    /// Rules that could not be honoured once collisions were resolved
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<ConstraintViolation>,
}

/// Error type for placement runs
#[derive(Debug, thiserror::Error)]
pub enum PlanogramError {
    #[error("Not enough space: {products} products for {cells} slots")]
    Capacity { products: usize, cells: usize },

    #[error("Cannot place all products: no free slot left for '{product_id}'")]
    PlacementImpossible { product_id: String },

    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PlanogramError>;
