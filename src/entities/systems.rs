use super::{Direction, GridMover, MoveRequest, PassRule, Player, Score};
use crate::tiles::{Level, TileKind, MAP_HEIGHT, MAP_WIDTH};
use crate::world::{ScrollEvent, TilemapEvent, TilemapService};
use bevy::prelude::*;

/// Z of movers above the tiles
const MOVER_Z: f32 = 1.0;

/// Whether `mover` may step in `direction` under its pass rule
pub fn can_move(service: &TilemapService, mover: &GridMover, direction: Direction) -> bool {
    let target = mover.target(direction);
    match mover.rule {
        PassRule::Player => service.can_player_pass_through(target, mover.level),
        PassRule::Shared => service.can_pass_through(target, mover.level),
    }
}

/// Step `mover` if allowed and return the kind it stepped onto.
///
/// Player movers hit the entered cell, so Ground is dug out and Treasure
/// collected.
pub fn try_move(
    service: &mut TilemapService,
    mover: &mut GridMover,
    direction: Direction,
) -> Option<TileKind> {
    if !can_move(service, mover, direction) {
        return None;
    }

    mover.position = mover.target(direction);
    let entered = service.get_block_type_at(mover.position, mover.level);
    if mover.rule == PassRule::Player {
        service.on_player_hit_tile(mover.position, mover.level);
    }
    Some(entered)
}

/// Kind of the cell `mover` stands on
pub fn block_type_at(service: &TilemapService, mover: &GridMover) -> TileKind {
    service.get_block_type_at(mover.position, mover.level)
}

/// Applies queued move requests to their movers
pub fn apply_move_requests(
    mut requests: MessageReader<MoveRequest>,
    mut service: ResMut<TilemapService>,
    mut movers: Query<&mut GridMover>,
) {
    for request in requests.read() {
        let Ok(mut mover) = movers.get_mut(request.entity) else {
            continue;
        };
        if try_move(&mut service, &mut mover, request.direction).is_none() {
            debug!(
                "{:?} blocked moving {:?} from {}",
                request.entity, request.direction, mover.position
            );
        }
    }
}

/// Adds treasure score from tile hits to every player
pub fn collect_score(
    mut events: MessageReader<TilemapEvent>,
    mut players: Query<&mut Score, With<Player>>,
) {
    let gained: u32 = events
        .read()
        .filter_map(|event| match event {
            TilemapEvent::TileHit { score_gained, .. } => Some(*score_gained),
            _ => None,
        })
        .sum();

    if gained == 0 {
        return;
    }
    for mut score in &mut players {
        score.0 += gained;
        info!("Score: {}", score.0);
    }
}

/// Move `mover` onto `level`, keeping its spot under the tilemap root as
/// far as the new level's grid allows. Movers already on `level` or below
/// are left alone.
pub fn follow_level(service: &TilemapService, mover: &mut GridMover, level: Level) -> bool {
    if mover.level >= level {
        return false;
    }

    let shift = service.resolved_origin(mover.level) - service.resolved_origin(level);
    let position = mover.position + IVec2::new(shift.x as i32, shift.y as i32);
    mover.position = position.clamp(
        IVec2::ZERO,
        IVec2::new(MAP_WIDTH as i32 - 1, MAP_HEIGHT as i32 - 1),
    );
    mover.level = level;
    true
}

/// Carries movers left behind by a finished scroll onto the new level
pub fn follow_scroll(
    mut events: MessageReader<ScrollEvent>,
    service: Res<TilemapService>,
    mut movers: Query<(Entity, &mut GridMover)>,
) {
    for event in events.read() {
        let ScrollEvent::Completed(current) = *event else {
            continue;
        };
        for (entity, mut mover) in &mut movers {
            if follow_level(&service, &mut mover, current) {
                debug!("{:?} now on level {} at {}", entity, current, mover.position);
            }
        }
    }
}

/// Places movers at their cell under the tilemap root
pub fn sync_mover_transforms(
    service: Res<TilemapService>,
    mut query: Query<(&GridMover, &mut Transform)>,
) {
    for (mover, mut transform) in &mut query {
        let origin = service.resolved_origin(mover.level);
        let translation = origin + mover.position.as_vec2().extend(MOVER_Z);
        if transform.translation != translation {
            transform.translation = translation;
        }
    }
}
