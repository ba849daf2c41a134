pub mod spawning;
pub mod systems;
pub mod types;

pub use spawning::*;
pub use systems::*;
pub use types::*;

use crate::world::{ScrollEvent, TilemapEvent};
use bevy::prelude::*;

/// Plugin for grid movers that walk and dig the tilemap.
///
/// Needs [`crate::world::TilemapPlugin`] for the tile service.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MoveRequest>()
            .add_message::<TilemapEvent>()
            .add_message::<ScrollEvent>()
            .add_systems(
                Update,
                (
                    follow_scroll,
                    apply_move_requests,
                    collect_score,
                    sync_mover_transforms,
                )
                    .chain(),
            );
    }
}
