//! Priority scoring.
//!
//! Every metric is min-max normalized over the current batch, so a product's
//! score depends on which other products are being placed with it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::Product;

pub const SALES_WEIGHT: f64 = 0.5;
pub const STOCK_WEIGHT: f64 = 0.2;
pub const DEMAND_WEIGHT: f64 = 0.2;
pub const PROMOTION_WEIGHT: f64 = 0.1;

/// Keeps normalization finite when every value of a metric is equal.
const NORMALIZATION_EPSILON: f64 = 1e-9;

fn default_boost_factor() -> f64 {
    1.5
}

/// Multiplies the ordering score of promoted products
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PromotionBoost {
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f64,
}

impl Default for PromotionBoost {
    fn default() -> Self {
        Self {
            boost_factor: default_boost_factor(),
        }
    }
}

/// Base score and the boosted score used for ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductScore {
    pub score: f64,
    pub adjusted_score: f64,
}

fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + NORMALIZATION_EPSILON;
    values.iter().map(|v| (v - min) / range).collect()
}

/// Normalized values of one metric; absent values count as 0.
fn normalized_metric(products: &[Product], get: impl Fn(&Product) -> Option<f64>) -> Vec<f64> {
    let values: Vec<f64> = products.iter().map(|p| get(p).unwrap_or(0.0)).collect();
    normalize(&values)
}

/// Weighted priority score of every product, in input order.
pub fn base_scores(products: &[Product]) -> Vec<f64> {
    let sales = normalized_metric(products, |p| p.average_sales);
    let stock = normalized_metric(products, |p| p.average_stock);
    let demand = normalized_metric(products, |p| p.forecast_demand);

    products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let promotion = if product.is_promoted() { 1.0 } else { 0.0 };
            SALES_WEIGHT * sales[i]
                + STOCK_WEIGHT * stock[i]
                + DEMAND_WEIGHT * demand[i]
                + PROMOTION_WEIGHT * promotion
        })
        .collect()
}

/// Scores every product and applies the optional promotion boost.
/// The boost only affects `adjusted_score`.
pub fn score_products(products: &[Product], boost: Option<&PromotionBoost>) -> Vec<ProductScore> {
    base_scores(products)
        .into_iter()
        .zip(products)
        .map(|(score, product)| {
            let adjusted_score = match boost {
                Some(boost) if product.is_promoted() => score * boost.boost_factor,
                _ => score,
            };
            ProductScore {
                score,
                adjusted_score,
            }
        })
        .collect()
}

/// Product indices by adjusted score, highest first. The sort is stable so
/// equal scores keep their input order.
pub fn ranking(scores: &[ProductScore]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .adjusted_score
            .partial_cmp(&scores[a].adjusted_score)
            .unwrap_or(Ordering::Equal)
    });
    order
}
