use bevy::prelude::*;
use tilescroll::entities::{
    spawn_enemy, spawn_player, Direction, GridMover, MoveRequest, MovementPlugin, Player,
};
use tilescroll::tiles::{TileKind, GROUND_AREA_HEIGHT, MAP_HEIGHT, MAP_WIDTH, TILE_DISPLAY_SIZE};
use tilescroll::world::{ScrollController, SimpleScrollTrigger, TileSprite, TilemapRoot};
use tilescroll::{TilemapConfig, TilemapPlugin};

const CONFIG_PATH: &str = "assets/tilemap.ron";

fn main() {
    let config = load_config();

    App::new()
        .add_plugins(DefaultPlugins.set(ImagePlugin::default_nearest()))
        .add_plugins((TilemapPlugin::new(config), MovementPlugin))
        .add_systems(Startup, setup_camera)
        .add_systems(PostStartup, spawn_movers)
        .add_systems(
            Update,
            (
                trigger_scroll_on_key,
                player_input,
                add_tile_sprites,
                recolor_tiles,
            ),
        )
        .run();
}

/// Config file is optional; a broken one falls back to defaults
fn load_config() -> TilemapConfig {
    let Ok(text) = std::fs::read_to_string(CONFIG_PATH) else {
        return TilemapConfig::default();
    };
    match TilemapConfig::from_ron_str(&text) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            eprintln!("{}: {}, using defaults", CONFIG_PATH, e);
            TilemapConfig::default()
        }
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / TILE_DISPLAY_SIZE,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(
            MAP_WIDTH as f32 / 2.0,
            MAP_HEIGHT as f32 / 2.0,
            999.0,
        ),
    ));
    info!("Camera setup complete");
}

fn spawn_movers(
    mut commands: Commands,
    controller: Res<ScrollController>,
    root_query: Query<Entity, With<TilemapRoot>>,
) {
    let Ok(root) = root_query.single() else {
        error!("Tilemap root missing, no movers spawned");
        return;
    };

    let level = controller.current_level();
    let surface = (MAP_HEIGHT - GROUND_AREA_HEIGHT) as i32;
    spawn_player(
        &mut commands,
        root,
        GridMover::player(IVec2::new(MAP_WIDTH as i32 / 2, surface), level),
    );
    spawn_enemy(
        &mut commands,
        root,
        GridMover::enemy(IVec2::new(2, surface), level),
    );
}

/// Space starts a scroll through the manual trigger
fn trigger_scroll_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut trigger: ResMut<SimpleScrollTrigger>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        trigger.trigger();
    }
}

fn player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    player_query: Query<Entity, With<Player>>,
    mut requests: MessageWriter<MoveRequest>,
) {
    let Ok(player) = player_query.single() else {
        return;
    };

    let bindings = [
        (KeyCode::ArrowUp, KeyCode::KeyW, Direction::Up),
        (KeyCode::ArrowDown, KeyCode::KeyS, Direction::Down),
        (KeyCode::ArrowLeft, KeyCode::KeyA, Direction::Left),
        (KeyCode::ArrowRight, KeyCode::KeyD, Direction::Right),
    ];
    for (arrow, letter, direction) in bindings {
        if keyboard.just_pressed(arrow) || keyboard.just_pressed(letter) {
            requests.write(MoveRequest {
                entity: player,
                direction,
            });
        }
    }
}

fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::Sky => Color::srgb(0.45, 0.7, 0.95),
        TileKind::Empty => Color::srgb(0.12, 0.08, 0.06),
        TileKind::Ground => Color::srgb(0.45, 0.3, 0.15),
        TileKind::Rock => Color::srgb(0.5, 0.5, 0.55),
        TileKind::Treasure => Color::srgb(0.95, 0.75, 0.1),
    }
}

/// Gives newly mirrored tiles a visual
fn add_tile_sprites(mut commands: Commands, new_tiles: Query<(Entity, &TileSprite), Added<TileSprite>>) {
    for (entity, tile) in &new_tiles {
        commands
            .entity(entity)
            .insert(Sprite::from_color(tile_color(tile.kind), Vec2::ONE));
    }
}

fn recolor_tiles(mut tiles: Query<(&TileSprite, &mut Sprite), Changed<TileSprite>>) {
    for (tile, mut sprite) in &mut tiles {
        sprite.color = tile_color(tile.kind);
    }
}
