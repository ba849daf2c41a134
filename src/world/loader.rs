use super::events::{ScrollEvent, TilemapEvent};
use super::generator::TilemapGenerator;
use super::manager::TilemapService;
use super::scroll::ScrollController;
use super::seed::SeedManager;
use super::trigger::SimpleScrollTrigger;
use crate::config::TilemapConfig;
use crate::tiles::{Level, TileHandle, TileInstance, TileKind, TILE_Z};
use bevy::prelude::*;
use std::collections::HashMap;

/// Parent of every tile entity. Its `Transform` is what the scroll moves.
#[derive(Component, Debug, Default)]
pub struct TilemapRoot;

/// Entity mirror of one tile instance held by the service
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSprite {
    pub handle: TileHandle,
    pub kind: TileKind,
    pub level: Level,
    pub grid: IVec2,
}

impl From<&TileInstance> for TileSprite {
    fn from(tile: &TileInstance) -> Self {
        Self {
            handle: tile.handle,
            kind: tile.kind(),
            level: tile.level,
            grid: tile.grid,
        }
    }
}

/// Repeating timer for automatic scrolls
#[derive(Resource, Deref, DerefMut)]
pub struct AutoScrollTimer(pub Timer);

/// Repeating timer for rock-fall passes
#[derive(Resource, Deref, DerefMut)]
pub struct RockUpdateTimer(pub Timer);

/// System to spawn the tilemap root and place the starting level
pub fn setup_tilemap(
    mut commands: Commands,
    config: Res<TilemapConfig>,
    controller: Res<ScrollController>,
    mut service: ResMut<TilemapService>,
) {
    commands.spawn((
        TilemapRoot,
        Name::new("TilemapRoot"),
        Transform::default(),
        Visibility::default(),
    ));

    let level = controller.current_level();
    let mut generator = TilemapGenerator::new(SeedManager::new(config.base_seed));
    match generator.generate_map(level, config.base_seed) {
        Ok(map) => service.place_tiles(map),
        Err(e) => error!("Failed to generate starting level {}: {}", level, e),
    }
}

/// System to advance the manual scroll trigger
pub fn update_scroll_trigger(time: Res<Time>, mut trigger: ResMut<SimpleScrollTrigger>) {
    if trigger.is_scrolling() {
        trigger.update(time.delta_secs());
    }
}

/// System to start a scroll whenever the autoscroll timer fires
pub fn auto_scroll(
    time: Res<Time>,
    mut timer: ResMut<AutoScrollTimer>,
    mut controller: ResMut<ScrollController>,
) {
    timer.tick(time.delta());
    if timer.just_finished() && !controller.is_scrolling() {
        controller.start_scroll();
    }
}

/// System to react to trigger signals and step a running scroll
pub fn drive_scroll(
    time: Res<Time>,
    mut controller: ResMut<ScrollController>,
    mut service: ResMut<TilemapService>,
    mut root_query: Query<&mut Transform, With<TilemapRoot>>,
) {
    controller.poll_triggers();
    if !controller.is_scrolling() {
        return;
    }

    let Ok(mut root) = root_query.single_mut() else {
        error!("Tilemap root missing, cannot scroll");
        return;
    };

    // The controller already logged the failure and went idle; the next
    // trigger retries the same level
    if let Err(e) = controller.tick(time.delta_secs(), &mut service, &mut root.translation) {
        debug!("Scroll abandoned until the next trigger: {}", e);
    }
}

/// System to let rocks in the current level fall
pub fn update_rocks(
    time: Res<Time>,
    mut timer: ResMut<RockUpdateTimer>,
    controller: Res<ScrollController>,
    mut service: ResMut<TilemapService>,
) {
    timer.tick(time.delta());
    if timer.just_finished() {
        let delta = timer.duration().as_secs_f32();
        service.update_tiles_with_time(controller.current_level(), delta);
    }
}

/// System to publish service notifications as messages
pub fn forward_tilemap_events(
    mut service: ResMut<TilemapService>,
    mut writer: MessageWriter<TilemapEvent>,
) {
    // Only touch the resource mutably when there is something to drain
    if !service.has_pending_events() {
        return;
    }
    for event in service.drain_events() {
        writer.write(event);
    }
}

/// System to publish scroll notifications as messages
pub fn forward_scroll_events(
    mut controller: ResMut<ScrollController>,
    mut writer: MessageWriter<ScrollEvent>,
) {
    if !controller.has_pending_events() {
        return;
    }
    for event in controller.drain_events() {
        writer.write(event);
    }
}

/// System to keep one child entity of the root per tile instance
pub fn sync_tile_entities(
    mut commands: Commands,
    service: Res<TilemapService>,
    root_query: Query<Entity, With<TilemapRoot>>,
    mut tile_query: Query<(Entity, &mut TileSprite, &mut Transform, &mut Name)>,
) {
    let Ok(root) = root_query.single() else {
        return;
    };

    let mut pending: HashMap<TileHandle, &TileInstance> =
        service.all_tiles().map(|tile| (tile.handle, tile)).collect();

    for (entity, mut sprite, mut transform, mut name) in &mut tile_query {
        let Some(tile) = pending.remove(&sprite.handle) else {
            commands.entity(entity).despawn();
            continue;
        };

        if sprite.kind != tile.kind() {
            sprite.kind = tile.kind();
            *name = Name::new(tile.label());
        }
        let translation = tile.position.with_z(TILE_Z);
        if transform.translation != translation {
            transform.translation = translation;
        }
    }

    let spawned = pending.len();
    for tile in pending.into_values() {
        commands.spawn((
            TileSprite::from(tile),
            Name::new(tile.label()),
            Transform::from_translation(tile.position.with_z(TILE_Z)),
            Visibility::default(),
            ChildOf(root),
        ));
    }

    if spawned > 0 {
        debug!("Spawned {} tile entities", spawned);
    }
}

/// System to log tilemap statistics for debugging
pub fn log_tilemap_stats(service: Res<TilemapService>) {
    debug!("Tilemap stats: {}", service.stats());
}

/// System to print the loaded level window after every scroll
#[cfg(feature = "debug_levels")]
pub fn print_level_window(
    service: Res<TilemapService>,
    mut events: MessageReader<ScrollEvent>,
) {
    for event in events.read() {
        if let ScrollEvent::Completed(current) = event {
            info!("{}", format_level_window(&service.loaded_levels(), *current));
        }
    }
}

/// Render loaded levels around `current` as a vertical strip
#[cfg(feature = "debug_levels")]
fn format_level_window(loaded: &[Level], current: Level) -> String {
    use crate::tiles::MEMORY_WINDOW;

    let view_radius = MEMORY_WINDOW + 2;
    let mut grid = String::new();
    grid.push_str("\n╔═══ Levels ═══╗\n");

    for level in (current - view_radius).max(1)..=current + view_radius {
        let is_loaded = loaded.contains(&level);
        let in_window = (level - current).abs() <= MEMORY_WINDOW;

        let symbol = if level == current {
            "@" // Current level
        } else if is_loaded && in_window {
            "█" // Resident
        } else if is_loaded {
            "▓" // Resident, about to be evicted
        } else {
            "·" // Not loaded
        };

        grid.push_str(&format!("║ {:>4}  {}     ║\n", level, symbol));
    }

    grid.push_str("╚══════════════╝\n");
    grid.push_str(&format!("Loaded: {:?} | Current: {}\n", loaded, current));
    grid
}
