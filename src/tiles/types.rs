use serde::{Deserialize, Serialize};
use std::fmt;

/// Level number. Level 1 is the surface; deeper levels count upward.
pub type Level = i32;

/// Integer seed driving terrain generation
pub type Seed = i64;

/// Logical content of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    Sky,
    #[default]
    Empty,
    Ground,
    Rock,
    Treasure,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Sky,
        TileKind::Empty,
        TileKind::Ground,
        TileKind::Rock,
        TileKind::Treasure,
    ];

    /// Wall-like kinds that overlap protection refuses to double-place
    pub const fn is_protected(self) -> bool {
        matches!(self, TileKind::Ground | TileKind::Rock)
    }

    /// Kinds a rock falling downward comes to rest on
    pub const fn stops_fall(self) -> bool {
        matches!(self, TileKind::Ground | TileKind::Rock)
    }

    pub const fn name(self) -> &'static str {
        match self {
            TileKind::Sky => "Sky",
            TileKind::Empty => "Empty",
            TileKind::Ground => "Ground",
            TileKind::Rock => "Rock",
            TileKind::Treasure => "Treasure",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
