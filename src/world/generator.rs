use super::procedural::ProceduralGenerator;
use super::seed::SeedManager;
use crate::error::Result;
use crate::tiles::{Level, MapData, Seed, GROUND_AREA_HEIGHT, MAP_HEIGHT, MAP_WIDTH};

/// Anything that can produce the map for a level.
///
/// The scroll controller only sees this trait, so tests can swap in sources
/// that fail or return fixed maps.
pub trait LevelSource: Send + Sync {
    fn generate_map(&mut self, level: Level, seed: Seed) -> Result<MapData>;

    fn seed_for_level(&self, level: Level) -> Seed;
}

/// Produces complete `MapData` for a level from a seed
#[derive(Debug, Clone)]
pub struct TilemapGenerator {
    seeds: SeedManager,
    terrain: ProceduralGenerator,
}

impl TilemapGenerator {
    pub fn new(seeds: SeedManager) -> Self {
        Self {
            seeds,
            terrain: ProceduralGenerator::new(MAP_WIDTH, MAP_HEIGHT, GROUND_AREA_HEIGHT),
        }
    }

    /// Generate `level` using `seed` as the base seed
    pub fn generate_map(&mut self, level: Level, seed: Seed) -> Result<MapData> {
        self.seeds.set_seed(seed);
        let mut rng = self.seeds.create_random_for_level(level);
        let tiles = self.terrain.generate_terrain(&mut rng, level)?;
        Ok(MapData::new(tiles, seed, level))
    }

    pub fn seed_for_level(&self, level: Level) -> Seed {
        self.seeds.seed_for_level(level)
    }
}

impl Default for TilemapGenerator {
    fn default() -> Self {
        Self::new(SeedManager::default())
    }
}

impl LevelSource for TilemapGenerator {
    fn generate_map(&mut self, level: Level, seed: Seed) -> Result<MapData> {
        TilemapGenerator::generate_map(self, level, seed)
    }

    fn seed_for_level(&self, level: Level) -> Seed {
        TilemapGenerator::seed_for_level(self, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileKind;

    #[test]
    fn test_generate_map_shape() {
        let mut generator = TilemapGenerator::default();
        let map = generator.generate_map(3, 777).unwrap();

        assert_eq!(map.width(), MAP_WIDTH);
        assert_eq!(map.height(), MAP_HEIGHT);
        assert_eq!(map.seed(), 777);
        assert_eq!(map.level(), 3);
    }

    #[test]
    fn test_generation_is_deterministic() {
        for seed in [0, 1, 12345, -42, i64::MAX] {
            for level in 1..6 {
                let a = TilemapGenerator::default().generate_map(level, seed).unwrap();
                let b = TilemapGenerator::new(SeedManager::new(seed ^ 0x55))
                    .generate_map(level, seed)
                    .unwrap();
                assert_eq!(a.tiles(), b.tiles(), "seed {seed} level {level}");
            }
        }
    }

    #[test]
    fn test_reused_generator_is_deterministic() {
        let mut generator = TilemapGenerator::default();
        let first = generator.generate_map(2, 5).unwrap();
        let _ = generator.generate_map(9, 1000).unwrap();
        let again = generator.generate_map(2, 5).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_levels_differ() {
        let mut generator = TilemapGenerator::default();
        let two = generator.generate_map(2, 5).unwrap();
        let three = generator.generate_map(3, 5).unwrap();
        assert_ne!(two.tiles(), three.tiles());
        assert_eq!(three.tiles().count(TileKind::Sky), 0);
    }

    #[test]
    fn test_seed_for_level_follows_last_base() {
        let mut generator = TilemapGenerator::new(SeedManager::new(100));
        assert_eq!(generator.seed_for_level(2), 2100);
        generator.generate_map(1, 0).unwrap();
        assert_eq!(generator.seed_for_level(2), 2000);
    }
}
