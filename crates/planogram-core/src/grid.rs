use serde::{Deserialize, Serialize};

use crate::furniture::Face;
use crate::types::{PlanogramError, Result};

/// Most shelves a fixture may have
pub const MAX_SHELVES: u32 = 100;
/// Most columns a shelf may have
pub const MAX_COLUMNS: u32 = 1_000;
/// Most slots over every face of a fixture
pub const MAX_CELLS: usize = 100_000;

fn default_faces() -> u8 {
    1
}

/// Size of the slot space: shelves x columns, replicated on each face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub shelves: u32,
    pub columns: u32,
    #[serde(default = "default_faces")]
    pub faces: u8,
}

impl GridShape {
    /// Builds a validated shape.
    pub fn new(shelves: u32, columns: u32, faces: u8) -> Result<Self> {
        let shape = Self {
            shelves,
            columns,
            faces,
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shelves < 1 {
            return Err(PlanogramError::MalformedGrid(
                "shelf_count must be at least 1".to_string(),
            ));
        }

        if self.columns < 1 {
            return Err(PlanogramError::MalformedGrid(
                "column_count must be at least 1".to_string(),
            ));
        }

        if self.shelves > MAX_SHELVES {
            return Err(PlanogramError::MalformedGrid(format!(
                "shelf_count {} exceeds the maximum of {}",
                self.shelves, MAX_SHELVES
            )));
        }

        if self.columns > MAX_COLUMNS {
            return Err(PlanogramError::MalformedGrid(format!(
                "column_count {} exceeds the maximum of {}",
                self.columns, MAX_COLUMNS
            )));
        }

        if !matches!(self.faces, 1 | 2 | 4) {
            return Err(PlanogramError::MalformedGrid(format!(
                "a fixture has 1, 2 or 4 faces, got {}",
                self.faces
            )));
        }

        if self.capacity() > MAX_CELLS {
            return Err(PlanogramError::MalformedGrid(format!(
                "{} slots exceed the maximum of {}",
                self.capacity(),
                MAX_CELLS
            )));
        }

        Ok(())
    }

    pub fn cells_per_face(&self) -> usize {
        self.shelves as usize * self.columns as usize
    }

    pub fn capacity(&self) -> usize {
        self.cells_per_face() * usize::from(self.faces)
    }

    pub fn faces(&self) -> &'static [Face] {
        Face::for_count(self.faces)
    }

    pub fn has_face(&self, face: Face) -> bool {
        self.faces().contains(&face)
    }

    /// Whether a (possibly out of range) position lies inside the grid.
    pub fn contains(&self, face: Face, shelf: i64, column: i64) -> bool {
        self.has_face(face)
            && (1..=i64::from(self.shelves)).contains(&shelf)
            && (1..=i64::from(self.columns)).contains(&column)
    }

    /// 1-based columns ordered by distance to the horizontal center of a shelf,
    /// so the most visible columns come first. Ties keep left-to-right order.
    pub fn center_out_columns(&self) -> Vec<u32> {
        let center = f64::from(self.columns) / 2.0;
        let mut columns: Vec<u32> = (0..self.columns).collect();
        columns.sort_by(|a, b| {
            let da = (f64::from(*a) - center).abs();
            let db = (f64::from(*b) - center).abs();
            da.total_cmp(&db)
        });
        columns.into_iter().map(|c| c + 1).collect()
    }

    /// First column of [`Self::center_out_columns`].
    pub fn central_column(&self) -> u32 {
        self.center_out_columns().first().copied().unwrap_or(1)
    }
}

/// Occupancy of every slot. Cells store the index of the product sitting there.
#[derive(Debug, Clone)]
pub struct Grid {
    shape: GridShape,
    cells: Vec<Option<usize>>,
}

impl Grid {
    pub fn new(shape: GridShape) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            shape,
            cells: vec![None; shape.capacity()],
        })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, face: Face, shelf: u32, column: u32) -> Option<usize> {
        if !self.shape.contains(face, i64::from(shelf), i64::from(column)) {
            return None;
        }
        // Faces are laid out in assignment order, so a face's position in the
        // shape's face list is its block number.
        let block = self.shape.faces().iter().position(|f| *f == face)?;
        let row = (shelf - 1) as usize;
        let col = (column - 1) as usize;
        Some(block * self.shape.cells_per_face() + row * self.shape.columns as usize + col)
    }

    /// True when the slot exists and nobody sits there.
    pub fn is_free(&self, face: Face, shelf: u32, column: u32) -> bool {
        matches!(self.index(face, shelf, column), Some(i) if self.cells[i].is_none())
    }

    /// Puts `item` on a free slot. Returns false when the slot is taken or
    /// outside the grid.
    pub fn occupy(&mut self, face: Face, shelf: u32, column: u32, item: usize) -> bool {
        match self.index(face, shelf, column) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(item);
                true
            }
            _ => false,
        }
    }

    /// First free column of a shelf, scanning `columns` in the given order.
    pub fn first_free_in_row(&self, face: Face, shelf: u32, columns: &[u32]) -> Option<u32> {
        columns
            .iter()
            .copied()
            .find(|&column| self.is_free(face, shelf, column))
    }

    /// First free slot of a face, scanning shelf by shelf from (1, 1).
    pub fn first_free_row_major(&self, face: Face) -> Option<(u32, u32)> {
        (1..=self.shape.shelves)
            .flat_map(|shelf| (1..=self.shape.columns).map(move |column| (shelf, column)))
            .find(|&(shelf, column)| self.is_free(face, shelf, column))
    }

    /// First free slot of a face among the given shelves and columns, shelf
    /// by shelf in the order given.
    pub fn first_free_among(
        &self,
        face: Face,
        shelves: &[u32],
        columns: &[u32],
    ) -> Option<(u32, u32)> {
        shelves
            .iter()
            .flat_map(|&shelf| columns.iter().map(move |&column| (shelf, column)))
            .find(|&(shelf, column)| self.is_free(face, shelf, column))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
