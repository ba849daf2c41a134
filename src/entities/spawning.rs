use super::{GridMover, Player, Score};
use bevy::prelude::*;

const PLAYER_COLOR: Color = Color::srgb(0.95, 0.85, 0.2);
const ENEMY_COLOR: Color = Color::srgb(0.85, 0.2, 0.25);

/// Spawns the player as a child of the tilemap root so it scrolls with the map
pub fn spawn_player(commands: &mut Commands, root: Entity, mover: GridMover) -> Entity {
    commands
        .spawn((
            Player,
            Score::default(),
            mover,
            Name::new("Player"),
            Sprite::from_color(PLAYER_COLOR, Vec2::splat(0.8)),
            Transform::default(),
            ChildOf(root),
        ))
        .id()
}

/// Spawns an enemy mover under the tilemap root
pub fn spawn_enemy(commands: &mut Commands, root: Entity, mover: GridMover) -> Entity {
    commands
        .spawn((
            mover,
            Name::new("Enemy"),
            Sprite::from_color(ENEMY_COLOR, Vec2::splat(0.8)),
            Transform::default(),
            ChildOf(root),
        ))
        .id()
}
