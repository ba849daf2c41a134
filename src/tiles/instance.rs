use super::types::{Level, TileKind};
use bevy::prelude::*;

/// Opaque identity of one materialized tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileHandle(pub u64);

/// One placed grid cell: the displayable counterpart of a `TileKind`.
///
/// `position` is local to the tilemap root, which is the entity the scroll
/// animation moves.
#[derive(Debug, Clone, PartialEq)]
pub struct TileInstance {
    pub handle: TileHandle,
    pub level: Level,
    pub grid: IVec2,
    pub position: Vec3,
    kind: TileKind,
    protected: bool,
}

impl TileInstance {
    pub fn new(handle: TileHandle, kind: TileKind, level: Level, grid: IVec2) -> Self {
        Self {
            handle,
            level,
            grid,
            position: Vec3::new(grid.x as f32, grid.y as f32, 0.0),
            kind,
            protected: kind.is_protected(),
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Whether overlap protection keeps other levels from placing onto this tile
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_kind(&mut self, kind: TileKind) {
        self.kind = kind;
        self.protected = kind.is_protected();
    }

    /// Identity tag, e.g. `Ground_Level3_4_7`
    pub fn label(&self) -> String {
        format!(
            "{}_Level{}_{}_{}",
            self.kind, self.level, self.grid.x, self.grid.y
        )
    }

    /// Same x/y as `position` within float tolerance
    pub fn occupies(&self, position: Vec3) -> bool {
        approx_eq(self.position.x, position.x) && approx_eq(self.position.y, position.y)
    }
}

/// Float comparison scaled to magnitude, with an absolute floor for values near zero
pub fn approx_eq(a: f32, b: f32) -> bool {
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}
