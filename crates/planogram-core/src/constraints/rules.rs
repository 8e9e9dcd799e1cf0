use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{clamp_shelf, Predictions, RuleContext};
use crate::furniture::{Face, FurnitureType};
use crate::types::{LegalRestriction, Packaging, SupplierPlacement, Temperature, ZoneLocation};

/// 1. Cold products on furniture that cannot keep them cold move to a
/// refrigerator.
pub fn apply_temperature(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    for row in &mut predictions.rows {
        let Some(product) = ctx.product(&row.product_id) else {
            continue;
        };
        if product.temperature == Some(Temperature::Cold) && !row.furniture.is_refrigerated() {
            debug!(
                "Product {}: {} -> refrigerator (temperature)",
                row.product_id, row.furniture
            );
            row.reassign_furniture(FurnitureType::Refrigerator);
        }
    }
    predictions
}

/// 2. A face the furniture does not have becomes its first valid face.
pub fn apply_face_validity(mut predictions: Predictions, _ctx: &RuleContext<'_>) -> Predictions {
    for row in &mut predictions.rows {
        let available = row.furniture.available_faces();
        if !available.contains(&row.face) {
            debug!(
                "Product {}: face {:?} -> {:?}",
                row.product_id, row.face, available[0]
            );
            row.face = available[0];
        }
    }
    predictions
}

/// 3. Furniture dimensions are clipped to their limits.
pub fn apply_dimension_limits(mut predictions: Predictions, _ctx: &RuleContext<'_>) -> Predictions {
    let mut clipped: BTreeMap<&'static str, usize> = BTreeMap::new();
    for row in &mut predictions.rows {
        for field in row.dimensions.clip() {
            *clipped.entry(field).or_insert(0) += 1;
        }
    }

    for (field, count) in &clipped {
        info!("{} values of {} clipped to limits", count, field);
    }
    predictions
}

/// 4. Supplier placement requirements.
pub fn apply_supplier(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let (band_top, band_bottom) = ctx.settings.eye_level_band(&predictions.grid);
    for row in &mut predictions.rows {
        match ctx
            .product(&row.product_id)
            .and_then(|p| p.supplier_placement)
        {
            Some(SupplierPlacement::HeadOfGondola) => row.column = 1,
            Some(SupplierPlacement::EyeLevel) => row.shelf = row.shelf.max(band_top).min(band_bottom),
            None => {}
        }
    }
    predictions
}

/// 5. Fragile products get fewer units per slot, liquids stay low.
pub fn apply_packaging(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    // Second shelf from the bottom
    let low_ceiling = i64::from(predictions.grid.shelves.saturating_sub(1).max(1));
    for row in &mut predictions.rows {
        match ctx.product(&row.product_id).and_then(|p| p.packaging) {
            Some(Packaging::Fragile) => {
                row.quantity = row.quantity.min(ctx.settings.fragile_max_quantity)
            }
            Some(Packaging::Liquid) => row.shelf = row.shelf.max(low_ceiling),
            Some(Packaging::Standard) | None => {}
        }
    }
    predictions
}

/// 6. Age-restricted products go high, licensed products to the back face.
pub fn apply_legal(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let high_limit = clamp_shelf(ctx.settings.high_shelf_limit, &predictions.grid);
    for row in &mut predictions.rows {
        match ctx.product(&row.product_id).and_then(|p| p.legal) {
            Some(LegalRestriction::Age) => row.shelf = row.shelf.min(high_limit),
            Some(LegalRestriction::Licence) => {
                if row.furniture.offers_face(Face::Back) {
                    row.face = Face::Back;
                }
            }
            None => {}
        }
    }
    predictions
}

/// 7. Products of the current season get the front face, eye level and a
/// central column.
pub fn apply_seasonal(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let eye_level = clamp_shelf(ctx.settings.eye_level_shelf, &predictions.grid);
    let central = i64::from(predictions.grid.central_column());
    let mut promoted = 0;
    for row in &mut predictions.rows {
        let in_season = ctx
            .product(&row.product_id)
            .and_then(|p| p.season)
            .is_some_and(|season| season == ctx.season);
        if in_season {
            row.face = Face::Front;
            row.shelf = eye_level;
            row.column = central;
            promoted += 1;
        }
    }

    if promoted > 0 {
        debug!("{} products in season ({:?})", promoted, ctx.season);
    }
    predictions
}

/// 8. Cold store zones need refrigerated furniture; the entrance gets
/// attractive slots.
pub fn apply_zone(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let eye_level = clamp_shelf(ctx.settings.eye_level_shelf, &predictions.grid);
    for row in &mut predictions.rows {
        let Some(product) = ctx.product(&row.product_id) else {
            continue;
        };

        if product.zone_temperature == Some(Temperature::Cold) && !row.furniture.is_refrigerated() {
            debug!(
                "Product {}: {} -> refrigerator (cold zone)",
                row.product_id, row.furniture
            );
            row.reassign_furniture(FurnitureType::Refrigerator);
        }

        if product.zone_location == Some(ZoneLocation::Entrance) {
            row.face = Face::Front;
            row.shelf = eye_level;
        }
    }
    predictions
}

/// 9. High priority products get premium slots and more stock, low priority
/// products move to the back and down.
pub fn apply_merchandising(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let settings = ctx.settings;
    let eye_level = clamp_shelf(settings.eye_level_shelf, &predictions.grid);
    let low_floor = clamp_shelf(settings.low_visibility_shelf, &predictions.grid);
    let central = i64::from(predictions.grid.central_column());

    for row in &mut predictions.rows {
        let Some(priority) = ctx
            .product(&row.product_id)
            .and_then(|p| p.merchandising_priority)
        else {
            continue;
        };

        if priority >= settings.high_priority_threshold {
            row.face = Face::Front;
            row.shelf = eye_level;
            row.column = central;
            row.quantity = row.quantity.max(settings.high_priority_min_quantity);
        } else if priority <= settings.low_priority_threshold {
            if row.furniture.offers_face(Face::Back) {
                row.face = Face::Back;
            }
            row.shelf = row.shelf.max(low_floor);
        }
    }
    predictions
}

/// 10. Small stores get compact furniture, large stores imposing furniture.
pub fn apply_store_surface(mut predictions: Predictions, ctx: &RuleContext<'_>) -> Predictions {
    let Some(surface) = ctx.store_surface else {
        return predictions;
    };
    let settings = ctx.settings;

    if surface < settings.small_store_surface {
        debug!("Small store ({} m2): compact furniture", surface);
        for row in &mut predictions.rows {
            row.dimensions.width = row.dimensions.width.min(settings.compact_width);
            row.dimensions.height = row.dimensions.height.min(settings.compact_height);
        }
    } else if surface > settings.large_store_surface {
        debug!("Large store ({} m2): imposing furniture", surface);
        for row in &mut predictions.rows {
            row.dimensions.width = row.dimensions.width.max(settings.imposing_width);
            row.dimensions.height = row.dimensions.height.max(settings.imposing_height);
        }
    }
    predictions
}
