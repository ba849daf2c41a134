use crate::error::Result;
use crate::tiles::{
    Level, TileGrid, TileKind, MAX_ROCKS_PER_LEVEL, MAX_ROCK_PLACEMENT_ATTEMPTS,
    MIN_ROCKS_PER_LEVEL,
};
use bevy::prelude::*;
use rand::Rng;

/// Fills a level's grid from a random source.
///
/// Level 1 gets a band of Sky across its top `ground_area_height` rows;
/// deeper levels are solid Ground. Both then receive 3-5 rocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProceduralGenerator {
    width: usize,
    height: usize,
    ground_area_height: usize,
}

impl ProceduralGenerator {
    pub fn new(width: usize, height: usize, ground_area_height: usize) -> Self {
        Self {
            width,
            height,
            ground_area_height,
        }
    }

    pub fn generate_terrain<R: Rng>(&self, rng: &mut R, level: Level) -> Result<TileGrid> {
        let mut tiles = TileGrid::filled(self.width, self.height, TileKind::Ground)?;

        if level == 1 {
            let sky_from = self.height.saturating_sub(self.ground_area_height);
            for x in 0..self.width {
                for y in sky_from..self.height {
                    tiles.set(IVec2::new(x as i32, y as i32), TileKind::Sky);
                }
            }
        }

        self.place_rocks(&mut tiles, rng);
        Ok(tiles)
    }

    fn place_rocks<R: Rng>(&self, tiles: &mut TileGrid, rng: &mut R) {
        let rock_count = rng.gen_range(MIN_ROCKS_PER_LEVEL..=MAX_ROCKS_PER_LEVEL);

        for _ in 0..rock_count {
            let mut attempts = 0;
            let pos = loop {
                let pos = IVec2::new(
                    rng.gen_range(0..self.width) as i32,
                    rng.gen_range(0..self.height) as i32,
                );
                attempts += 1;
                let taken = matches!(tiles.get(pos), Some(TileKind::Rock | TileKind::Sky));
                // At the cap the last sample is used even if it is taken.
                if !taken || attempts >= MAX_ROCK_PLACEMENT_ATTEMPTS {
                    break pos;
                }
            };
            tiles.set(pos, TileKind::Rock);
        }
    }
}
