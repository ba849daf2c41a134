use super::constants::TREASURE_SCORE;
use super::grid::TileGrid;
use super::types::TileKind;
use bevy::prelude::*;

/// Result of an actor hitting a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub new_kind: TileKind,
    pub score_gained: u32,
}

/// Per-kind tile rules: passability, hit reaction and time-based mutation.
pub trait TileBehavior: Send + Sync {
    fn can_player_pass_through(&self, kind: TileKind) -> bool;

    fn on_player_hit(&self, kind: TileKind, position: IVec2) -> HitOutcome;

    /// Apply time-driven rules to the cell at `position`. Evaluated once per
    /// call; the caller decides the cadence.
    fn on_time_update(&self, position: IVec2, grid: &mut TileGrid, delta_secs: f32);
}

/// Standard rule set: Ground digs out, Treasure scores, Rock falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTileBehavior {
    sky_passable: bool,
}

impl DefaultTileBehavior {
    /// Table that lets actors through Sky
    pub const fn new() -> Self {
        Self { sky_passable: true }
    }

    /// Table where Sky blocks like Rock
    pub const fn strict() -> Self {
        Self {
            sky_passable: false,
        }
    }

    pub const fn with_sky_passable(sky_passable: bool) -> Self {
        Self { sky_passable }
    }

    fn fall(position: IVec2, grid: &mut TileGrid) {
        // Scan down to the first solid cell; the grid floor counts as solid.
        let mut stop_y = position.y - 1;
        while stop_y >= 0 {
            match grid.get(IVec2::new(position.x, stop_y)) {
                Some(kind) if kind.stops_fall() => break,
                _ => stop_y -= 1,
            }
        }

        let rest = IVec2::new(position.x, stop_y + 1);
        if rest.y < position.y {
            grid.set(position, TileKind::Empty);
            grid.set(rest, TileKind::Rock);
        }
    }
}

impl Default for DefaultTileBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl TileBehavior for DefaultTileBehavior {
    fn can_player_pass_through(&self, kind: TileKind) -> bool {
        match kind {
            TileKind::Sky => self.sky_passable,
            TileKind::Empty | TileKind::Ground | TileKind::Treasure => true,
            TileKind::Rock => false,
        }
    }

    fn on_player_hit(&self, kind: TileKind, _position: IVec2) -> HitOutcome {
        match kind {
            TileKind::Ground => HitOutcome {
                new_kind: TileKind::Empty,
                score_gained: 0,
            },
            TileKind::Treasure => HitOutcome {
                new_kind: TileKind::Empty,
                score_gained: TREASURE_SCORE,
            },
            other => HitOutcome {
                new_kind: other,
                score_gained: 0,
            },
        }
    }

    fn on_time_update(&self, position: IVec2, grid: &mut TileGrid, _delta_secs: f32) {
        if grid.get(position) != Some(TileKind::Rock) {
            return;
        }

        let below = grid.get(position - IVec2::Y);
        let two_below = grid.get(position - IVec2::Y * 2);
        match (below, two_below) {
            (Some(TileKind::Empty), _) => Self::fall(position, grid),
            (Some(TileKind::Ground), Some(TileKind::Empty)) => Self::fall(position, grid),
            _ => {}
        }
    }
}
