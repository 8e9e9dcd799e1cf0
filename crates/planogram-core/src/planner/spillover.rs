use super::*;
use crate::grid::Grid;
use crate::zones::shelf_for_score;

/// Shelves to try for a product targeting `target`: the target first, then
/// the neighbours at growing distance, below before above
/// (`+1, -1, +2, -2, ...`), until the whole shelf range has been covered.
pub fn shelf_search_order(target: u32, shelf_count: u32) -> Vec<u32> {
    let target = i64::from(target.clamp(1, shelf_count.max(1)));
    let count = i64::from(shelf_count);

    let mut order = vec![target as u32];
    for distance in 1..count {
        for shelf in [target + distance, target - distance] {
            if (1..=count).contains(&shelf) {
                order.push(shelf as u32);
            }
        }
    }
    order
}

impl Planner {
    /// Assigns a slot to every product, best ranked first. Returns the slots
    /// indexed like the products.
    pub(super) fn fill_grid(&self, scores: &[ProductScore], order: &[usize]) -> Result<Vec<Slot>> {
        let products = &self.request.products;
        let mut grid = Grid::new(self.shape)?;
        let columns = self.shape.center_out_columns();
        let mut slots = vec![Slot::default(); products.len()];

        for &index in order {
            let product = &products[index];
            let target = shelf_for_score(scores[index].adjusted_score, self.shape.shelves);
            let search = shelf_search_order(target, self.shape.shelves);

            let found = self.shape.faces().iter().find_map(|&face| {
                search.iter().find_map(|&shelf| {
                    grid.first_free_in_row(face, shelf, &columns)
                        .map(|column| Slot {
                            face,
                            shelf,
                            column,
                        })
                })
            });

            let Some(slot) = found else {
                return Err(PlanogramError::PlacementImpossible {
                    product_id: product.id.clone(),
                });
            };

            if slot.shelf != target || slot.face != Face::Front {
                debug!(
                    "Product {}: target shelf {} full, spilled to {:?} shelf {}",
                    product.id, target, slot.face, slot.shelf
                );
            }

            grid.occupy(slot.face, slot.shelf, slot.column, index);
            slots[index] = slot;
        }

        debug!("{} of {} slots used", grid.occupied_count(), grid.capacity());
        Ok(slots)
    }
}
