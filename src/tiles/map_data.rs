use super::grid::TileGrid;
use super::types::{Level, Seed, TileKind};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tile data for one generated level.
///
/// Immutable once built: changing a cell produces a new `MapData` with its
/// own copy of the grid, so no two maps ever share tile storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapData {
    tiles: TileGrid,
    seed: Seed,
    level: Level,
}

impl MapData {
    pub fn new(tiles: TileGrid, seed: Seed, level: Level) -> Self {
        Self { tiles, seed, level }
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.tiles.contains(pos)
    }

    pub fn tile(&self, pos: IVec2) -> Option<TileKind> {
        self.tiles.get(pos)
    }

    /// Copy of this map with one cell replaced
    pub fn with_tile(&self, pos: IVec2, kind: TileKind) -> Self {
        let mut tiles = self.tiles.clone();
        tiles.set(pos, kind);
        self.with_grid(tiles)
    }

    /// Copy of this map's identity carrying a different grid
    pub fn with_grid(&self, tiles: TileGrid) -> Self {
        Self {
            tiles,
            seed: self.seed,
            level: self.level,
        }
    }
}
