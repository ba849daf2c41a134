use crate::tiles::Level;
use bevy::prelude::*;

/// One grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::Y,
            Direction::Down => IVec2::NEG_Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }
}

/// Which passability query a mover consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassRule {
    /// The tile behavior's table; entering a cell also hits it
    #[default]
    Player,
    /// The fixed Empty/Ground/Treasure set; entering a cell leaves it alone
    Shared,
}

/// Something that walks the tile grid of one level
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMover {
    pub position: IVec2,
    pub level: Level,
    pub rule: PassRule,
}

impl GridMover {
    pub fn player(position: IVec2, level: Level) -> Self {
        Self {
            position,
            level,
            rule: PassRule::Player,
        }
    }

    pub fn enemy(position: IVec2, level: Level) -> Self {
        Self {
            position,
            level,
            rule: PassRule::Shared,
        }
    }

    /// Cell one step away in `direction`
    pub fn target(&self, direction: Direction) -> IVec2 {
        self.position + direction.offset()
    }
}

/// Marker component for the player character
#[derive(Component)]
pub struct Player;

/// Request to move one mover a single step
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub entity: Entity,
    pub direction: Direction,
}

/// Score collected by a player mover
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u32);
