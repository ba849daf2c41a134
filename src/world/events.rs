use crate::tiles::{Level, MapData, TileKind};
use bevy::prelude::*;

/// Notifications raised by the tilemap service
#[derive(Message, Debug, Clone, PartialEq)]
pub enum TilemapEvent {
    /// A level's tiles were placed
    MapGenerated(MapData),
    /// Far levels were evicted around this current level
    MemoryOptimized(Level),
    /// A hit changed a tile
    TileHit {
        position: IVec2,
        old_kind: TileKind,
        score_gained: u32,
    },
    /// Time-based rules changed tiles in a level
    TilesUpdated(Level),
}

/// Notifications raised by the scroll controller
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    /// Scroll began from this level
    Started(Level),
    /// The next level was generated and placed
    NewLevelGenerated(Level),
    /// Scroll finished; carries the new current level
    Completed(Level),
}
