use tracing::{debug, warn};

use super::{apply_rules, PredictedRow, Predictions, RuleContext};
use crate::furniture::Face;
use crate::grid::{Grid, GridShape};
use crate::types::{PlanogramError, Result};

/// Gives every row its own slot inside the grid.
///
/// Rows are visited in order. A row outside the grid is first moved to
/// shelf 1, column 1 of its face (the front face when the grid lacks its
/// face). A row that lands on a taken slot, or that was moved to a slot its
/// rules would move it away from, is relocated. It takes the first free slot
/// the rules accept for it, scanning shelf by shelf from the top on its own
/// face first and then on the following faces. When the rules accept no free
/// slot, any free slot is taken in the same scanning order.
pub fn resolve_collisions(
    mut predictions: Predictions,
    ctx: &RuleContext<'_>,
) -> Result<Predictions> {
    let shape = predictions.grid;
    let mut grid = Grid::new(shape)?;

    if predictions.rows.len() > grid.capacity() {
        return Err(PlanogramError::Capacity {
            products: predictions.rows.len(),
            cells: grid.capacity(),
        });
    }

    let mut moved = 0;
    for (i, row) in predictions.rows.iter_mut().enumerate() {
        let mut clamped = false;
        if !shape.contains(row.face, row.shelf, row.column) {
            let face = if shape.has_face(row.face) {
                row.face
            } else {
                Face::Front
            };
            warn!(
                "Product {} out of bounds ({:?}, shelf {}, column {}), reset to (1, 1)",
                row.product_id, row.face, row.shelf, row.column
            );
            row.face = face;
            row.shelf = 1;
            row.column = 1;
            clamped = true;
        }

        // Bounds were just enforced
        let (shelf, column) = (row.shelf as u32, row.column as u32);
        if !clamped && grid.occupy(row.face, shelf, column, i) {
            continue;
        }

        let settled = SettledSlots::for_row(row, shape, ctx);
        if clamped
            && settled.accepts(row.face, shelf, column)
            && grid.occupy(row.face, shelf, column, i)
        {
            continue;
        }

        let Some((face, shelf, column)) = settled
            .first_free(&grid, row.face)
            .or_else(|| first_free_any(&grid, row.face))
        else {
            return Err(PlanogramError::PlacementImpossible {
                product_id: row.product_id.clone(),
            });
        };

        debug!(
            "Product {}: slot ({:?}, {}, {}) unavailable, moved to ({:?}, {}, {})",
            row.product_id, row.face, row.shelf, row.column, face, shelf, column
        );
        grid.occupy(face, shelf, column, i);
        row.face = face;
        row.shelf = i64::from(shelf);
        row.column = i64::from(column);
        moved += 1;
    }

    if moved > 0 {
        debug!("{} products relocated", moved);
    }
    Ok(predictions)
}

/// Faces, shelves and columns where the rules leave a row in place.
///
/// Rules move a row along each axis independently of the other two, so each
/// axis is tried on its own.
struct SettledSlots {
    faces: Vec<Face>,
    shelves: Vec<u32>,
    columns: Vec<u32>,
}

impl SettledSlots {
    fn for_row(row: &PredictedRow, shape: GridShape, ctx: &RuleContext<'_>) -> Self {
        let faces = settled_values(
            row,
            shape,
            ctx,
            shape.faces().to_vec(),
            |candidate, face| candidate.face = face,
            |candidate| candidate.face,
        );
        let shelves = settled_values(
            row,
            shape,
            ctx,
            (1..=i64::from(shape.shelves)).collect(),
            |candidate, shelf| candidate.shelf = shelf,
            |candidate| candidate.shelf,
        );
        let columns = settled_values(
            row,
            shape,
            ctx,
            (1..=i64::from(shape.columns)).collect(),
            |candidate, column| candidate.column = column,
            |candidate| candidate.column,
        );

        Self {
            faces,
            shelves: shelves.into_iter().map(|s| s as u32).collect(),
            columns: columns.into_iter().map(|c| c as u32).collect(),
        }
    }

    fn accepts(&self, face: Face, shelf: u32, column: u32) -> bool {
        self.faces.contains(&face) && self.shelves.contains(&shelf) && self.columns.contains(&column)
    }

    /// First free accepted slot, starting on `face` and wrapping over the
    /// following faces.
    fn first_free(&self, grid: &Grid, face: Face) -> Option<(Face, u32, u32)> {
        faces_from(grid.shape(), face)
            .filter(|f| self.faces.contains(f))
            .find_map(|f| {
                grid.first_free_among(f, &self.shelves, &self.columns)
                    .map(|(shelf, column)| (f, shelf, column))
            })
    }
}

/// Values of one axis for which running the rules does not move the row.
fn settled_values<T: Copy + PartialEq>(
    row: &PredictedRow,
    shape: GridShape,
    ctx: &RuleContext<'_>,
    candidates: Vec<T>,
    set: impl Fn(&mut PredictedRow, T),
    get: impl Fn(&PredictedRow) -> T,
) -> Vec<T> {
    let rows = candidates
        .iter()
        .map(|&value| {
            let mut candidate = row.clone();
            set(&mut candidate, value);
            candidate
        })
        .collect();
    let after = apply_rules(Predictions { grid: shape, rows }, ctx);

    candidates
        .into_iter()
        .zip(&after.rows)
        .filter(|(value, candidate)| get(*candidate) == *value)
        .map(|(value, _)| value)
        .collect()
}

/// Faces of the grid starting at `face`, wrapping around to the front.
fn faces_from(shape: GridShape, face: Face) -> impl Iterator<Item = Face> {
    let faces = shape.faces();
    let start = faces.iter().position(|f| *f == face).unwrap_or(0);
    faces.iter().copied().cycle().skip(start).take(faces.len())
}

fn first_free_any(grid: &Grid, face: Face) -> Option<(Face, u32, u32)> {
    faces_from(grid.shape(), face).find_map(|f| {
        grid.first_free_row_major(f)
            .map(|(shelf, column)| (f, shelf, column))
    })
}
