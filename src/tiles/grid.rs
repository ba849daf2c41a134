use super::types::TileKind;
use crate::error::{Result, TilemapError};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Owned 2D grid of tile kinds indexed `[x][y]`, with `y` growing upward.
///
/// Cells are stored column-major (`x * height + y`) so a column scan, which
/// the rock-fall rule does, walks contiguous memory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Create a grid with every cell set to `kind`
    pub fn filled(width: usize, height: usize, kind: TileKind) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TilemapError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![kind; width * height],
        })
    }

    /// Build a grid from column-major cells
    pub fn from_cells(width: usize, height: usize, cells: Vec<TileKind>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TilemapError::InvalidDimensions { width, height });
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(TilemapError::TileCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid from `columns[x][y]`
    pub fn from_columns(columns: Vec<Vec<TileKind>>) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        let cells: Vec<TileKind> = columns.into_iter().flatten().collect();
        Self::from_cells(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.x as usize * self.height + pos.y as usize)
    }

    /// Tile at `pos`, or `None` outside the grid
    pub fn get(&self, pos: IVec2) -> Option<TileKind> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Set the tile at `pos`. Returns false outside the grid.
    pub fn set(&mut self, pos: IVec2, kind: TileKind) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = kind;
                true
            }
            None => false,
        }
    }

    /// Iterate `(position, kind)` in x-major, y-ascending order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, TileKind)> + '_ {
        let height = self.height;
        self.cells.iter().enumerate().map(move |(i, &kind)| {
            let pos = IVec2::new((i / height) as i32, (i % height) as i32);
            (pos, kind)
        })
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|&&k| k == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_get_set() {
        let mut grid = TileGrid::filled(3, 4, TileKind::Ground).unwrap();

        assert!(grid.set(IVec2::new(2, 3), TileKind::Rock));
        assert_eq!(grid.get(IVec2::new(2, 3)), Some(TileKind::Rock));
        assert_eq!(grid.get(IVec2::new(0, 0)), Some(TileKind::Ground));

        // Out of bounds
        assert!(!grid.set(IVec2::new(3, 0), TileKind::Rock));
        assert_eq!(grid.get(IVec2::new(-1, 0)), None);
        assert_eq!(grid.get(IVec2::new(0, 4)), None);
    }

    #[test]
    fn test_from_columns_indexes_by_x_then_y() {
        let grid = TileGrid::from_columns(vec![
            vec![TileKind::Ground, TileKind::Sky],
            vec![TileKind::Treasure, TileKind::Rock],
        ])
        .unwrap();

        assert_eq!(grid.get(IVec2::new(0, 1)), Some(TileKind::Sky));
        assert_eq!(grid.get(IVec2::new(1, 0)), Some(TileKind::Treasure));
        assert_eq!(grid.get(IVec2::new(1, 1)), Some(TileKind::Rock));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            TileGrid::filled(0, 5, TileKind::Empty),
            Err(TilemapError::InvalidDimensions { width: 0, height: 5 })
        );
        assert_eq!(
            TileGrid::from_cells(2, 2, vec![TileKind::Empty; 3]),
            Err(TilemapError::TileCountMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_iter_order() {
        let grid = TileGrid::filled(2, 2, TileKind::Empty).unwrap();
        let positions: Vec<_> = grid.iter().map(|(pos, _)| pos).collect();
        assert_eq!(
            positions,
            vec![
                IVec2::new(0, 0),
                IVec2::new(0, 1),
                IVec2::new(1, 0),
                IVec2::new(1, 1)
            ]
        );
    }
}
