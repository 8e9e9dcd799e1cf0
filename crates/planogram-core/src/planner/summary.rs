use super::*;
use std::collections::HashMap;

impl Planner {
    /// Turns the constrained rows into placements ordered by face, shelf and
    /// column.
    pub(super) fn build_placements(
        &self,
        predictions: &Predictions,
        scores: &[ProductScore],
    ) -> Vec<Placement> {
        let index: HashMap<&str, usize> = self
            .request
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();

        let mut placements: Vec<Placement> = predictions
            .rows
            .iter()
            .filter_map(|row| {
                let i = *index.get(row.product_id.as_str())?;
                let product = &self.request.products[i];
                // Rows are inside the grid once collisions are resolved
                let shelf = row.shelf.clamp(1, i64::from(self.shape.shelves)) as u32;
                let column = row.column.clamp(1, i64::from(self.shape.columns)) as u32;
                let zone = self.zones.shelf(shelf);

                Some(Placement {
                    product_id: product.id.clone(),
                    category: product.category.clone(),
                    supplier: product.supplier.clone(),
                    shelf,
                    column,
                    face: row.face,
                    quantity: row.quantity,
                    score: scores[i].score,
                    adjusted_score: scores[i].adjusted_score,
                    visibility_level: zone.visibility,
                    commercial_zone: zone.commercial_zone,
                    shelf_height: zone.mid,
                    furniture: row.furniture,
                    promotion: product.is_promoted(),
                })
            })
            .collect();

        placements.sort_by_key(|p| (p.face, p.shelf, p.column));
        placements
    }

    /// Product count and average base score of every shelf, top shelf first.
    pub(super) fn shelf_summaries(&self, placements: &[Placement]) -> Vec<ShelfSummary> {
        let summaries: Vec<ShelfSummary> = self
            .zones
            .zones
            .iter()
            .map(|zone| {
                let scores: Vec<f64> = placements
                    .iter()
                    .filter(|p| p.shelf == zone.shelf)
                    .map(|p| p.score)
                    .collect();
                let average_score = if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                };

                ShelfSummary {
                    shelf: zone.shelf,
                    height: zone.mid,
                    product_count: scores.len(),
                    average_score,
                }
            })
            .collect();

        for summary in &summaries {
            debug!(
                "Shelf {} ({:.0} cm): {} products, average score {:.3}",
                summary.shelf, summary.height, summary.product_count, summary.average_score
            );
        }
        summaries
    }
}
