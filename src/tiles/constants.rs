/// Width of every generated level in tiles
pub const MAP_WIDTH: usize = 20;

/// Height of every generated level in tiles
pub const MAP_HEIGHT: usize = 30;

/// Rows of Sky at the top of level 1
pub const GROUND_AREA_HEIGHT: usize = 5;

/// Rows at the bottom of a newly generated level checked against resident tiles
pub const DEFAULT_OVERLAP_HEIGHT: usize = 5;

/// Levels kept resident on each side of the current level (5-level window)
pub const MEMORY_WINDOW: i32 = 2;

/// Seed distance between consecutive levels
pub const SEED_LEVEL_STRIDE: i64 = 1000;

/// Score awarded for digging out a treasure
pub const TREASURE_SCORE: u32 = 100;

/// Inclusive bounds on rocks placed per level
pub const MIN_ROCKS_PER_LEVEL: u32 = 3;
pub const MAX_ROCKS_PER_LEVEL: u32 = 5;

/// Rejection-sampling cap when searching for a free rock cell
pub const MAX_ROCK_PLACEMENT_ATTEMPTS: u32 = 100;

/// Display size of a tile in pixels (one tile is one local unit under the root)
pub const TILE_DISPLAY_SIZE: f32 = 16.0;

/// Z-position of tile entities under the tilemap root
pub const TILE_Z: f32 = 0.0;
