pub mod behavior;
pub mod constants;
pub mod grid;
pub mod instance;
pub mod map_data;
pub mod types;

// Re-export commonly used items
pub use behavior::{DefaultTileBehavior, HitOutcome, TileBehavior};
pub use constants::*;
pub use grid::TileGrid;
pub use instance::{approx_eq, TileHandle, TileInstance};
pub use map_data::MapData;
pub use types::{Level, Seed, TileKind};
