use crate::tiles::{Level, Seed, SEED_LEVEL_STRIDE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random source handed to terrain generation
pub type LevelRng = ChaCha8Rng;

/// Derives per-level seeds from a base seed
#[derive(Debug, Clone)]
pub struct SeedManager {
    base_seed: Seed,
    rng: LevelRng,
}

impl SeedManager {
    pub fn new(base_seed: Seed) -> Self {
        Self {
            base_seed,
            rng: seeded_rng(base_seed),
        }
    }

    /// Replace the base seed and reseed the manager's own generator
    pub fn set_seed(&mut self, base_seed: Seed) {
        self.base_seed = base_seed;
        self.rng = seeded_rng(base_seed);
    }

    pub fn base_seed(&self) -> Seed {
        self.base_seed
    }

    /// Generator seeded from the base seed alone
    pub fn rng(&mut self) -> &mut LevelRng {
        &mut self.rng
    }

    /// `base + level * 1000`
    pub fn seed_for_level(&self, level: Level) -> Seed {
        self.base_seed
            .wrapping_add(Seed::from(level).wrapping_mul(SEED_LEVEL_STRIDE))
    }

    /// Fresh generator for `level`; equal inputs give equal sequences
    pub fn create_random_for_level(&self, level: Level) -> LevelRng {
        seeded_rng(self.seed_for_level(level))
    }
}

impl Default for SeedManager {
    fn default() -> Self {
        Self::new(0)
    }
}

fn seeded_rng(seed: Seed) -> LevelRng {
    LevelRng::seed_from_u64(seed as u64)
}
