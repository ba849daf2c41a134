pub mod events;
pub mod generator;
pub mod loader;
pub mod manager;
pub mod procedural;
pub mod scroll;
pub mod seed;
pub mod trigger;

// Re-export commonly used items
pub use events::{ScrollEvent, TilemapEvent};
pub use generator::{LevelSource, TilemapGenerator};
pub use loader::{TileSprite, TilemapRoot};
pub use manager::{TilemapService, TilemapStats};
pub use procedural::ProceduralGenerator;
pub use scroll::{ScrollController, ScrollControllerBuilder};
pub use seed::{LevelRng, SeedManager};
pub use trigger::{scroll_trigger_channel, SimpleScrollTrigger, TriggerSignal};

use crate::config::TilemapConfig;
use crate::tiles::DefaultTileBehavior;
use bevy::prelude::*;
use bevy::time::common_conditions::on_timer;
use std::time::Duration;

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Plugin for the streaming tilemap: level generation, scrolling, tile
/// updates and the entity mirror of every placed tile.
#[derive(Default)]
pub struct TilemapPlugin {
    pub config: TilemapConfig,
}

impl TilemapPlugin {
    pub fn new(config: TilemapConfig) -> Self {
        Self { config }
    }
}

impl Plugin for TilemapPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        let mut controller = match ScrollController::builder()
            .level_source(TilemapGenerator::new(SeedManager::new(config.base_seed)))
            .config(&config)
            .build()
        {
            Ok(controller) => controller,
            Err(e) => {
                error!("Tilemap plugin disabled: {}", e);
                return;
            }
        };

        let mut trigger = SimpleScrollTrigger::new(
            SimpleScrollTrigger::DEFAULT_SPEED,
            controller.scroll_distance(),
        );
        controller.register_trigger(trigger.subscribe());

        if let Some(secs) = config.auto_scroll_interval {
            app.insert_resource(loader::AutoScrollTimer(Timer::from_seconds(
                secs,
                TimerMode::Repeating,
            )));
        }
        if let Some(secs) = config.rock_update_interval {
            app.insert_resource(loader::RockUpdateTimer(Timer::from_seconds(
                secs,
                TimerMode::Repeating,
            )));
        }

        app.insert_resource(TilemapService::new(DefaultTileBehavior::with_sky_passable(
            config.sky_passable_for_player,
        )))
        .insert_resource(controller)
        .insert_resource(trigger)
        .insert_resource(config)
        .add_message::<TilemapEvent>()
        .add_message::<ScrollEvent>()
        .add_systems(Startup, loader::setup_tilemap)
        .add_systems(
            Update,
            (
                loader::update_scroll_trigger,
                loader::auto_scroll.run_if(resource_exists::<loader::AutoScrollTimer>),
                loader::drive_scroll,
                loader::update_rocks.run_if(resource_exists::<loader::RockUpdateTimer>),
                loader::forward_tilemap_events,
                loader::forward_scroll_events,
                loader::sync_tile_entities.run_if(resource_changed::<TilemapService>),
            )
                .chain(),
        )
        .add_systems(
            Update,
            loader::log_tilemap_stats.run_if(on_timer(STATS_LOG_INTERVAL)),
        );

        #[cfg(feature = "debug_levels")]
        app.add_systems(
            Update,
            loader::print_level_window.after(loader::forward_scroll_events),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{MAP_HEIGHT, MAP_WIDTH};
    use bevy::time::TimeUpdateStrategy;

    fn test_app(config: TilemapConfig) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TilemapPlugin::new(config)))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
                250,
            )));
        app
    }

    fn quiet_config() -> TilemapConfig {
        TilemapConfig {
            auto_scroll_interval: None,
            rock_update_interval: None,
            ..default()
        }
    }

    fn tile_entity_count(app: &mut App) -> usize {
        app.world_mut()
            .query::<&TileSprite>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn test_plugin_places_starting_level() {
        let mut app = test_app(quiet_config());
        app.update();

        let service = app.world().resource::<TilemapService>();
        assert!(service.is_map_loaded(1));
        assert_eq!(service.loaded_levels(), vec![1]);
        assert_eq!(tile_entity_count(&mut app), MAP_WIDTH * MAP_HEIGHT);
    }

    #[test]
    fn test_manual_trigger_scrolls_one_level() {
        let mut app = test_app(quiet_config());
        app.update();

        app.world_mut().resource_mut::<SimpleScrollTrigger>().trigger();
        for _ in 0..100 {
            app.update();
        }

        let controller = app.world().resource::<ScrollController>();
        assert_eq!(controller.current_level(), 2);
        assert!(!controller.is_scrolling());

        let root = app
            .world_mut()
            .query_filtered::<&Transform, With<TilemapRoot>>()
            .single(app.world())
            .unwrap();
        assert_eq!(root.translation, Vec3::new(0.0, MAP_HEIGHT as f32, 0.0));

        let service = app.world().resource::<TilemapService>();
        assert_eq!(service.loaded_levels(), vec![1, 2]);
        let expected = service.all_tiles().count();
        assert_eq!(tile_entity_count(&mut app), expected);
    }

    #[test]
    fn test_autoscroll_advances_levels() {
        let config = TilemapConfig {
            auto_scroll_interval: Some(0.5),
            rock_update_interval: None,
            scroll_speed: 60.0,
            ..default()
        };
        let mut app = test_app(config);
        for _ in 0..40 {
            app.update();
        }

        let controller = app.world().resource::<ScrollController>();
        assert!(controller.current_level() > 2);
        let service = app.world().resource::<TilemapService>();
        assert!(service.loaded_levels().len() <= 5);
    }

    #[test]
    fn test_invalid_config_values_fall_back() {
        let config = TilemapConfig {
            scroll_speed: -3.0,
            initial_level: 0,
            ..quiet_config()
        };
        let mut app = test_app(config);
        app.update();

        let controller = app.world().resource::<ScrollController>();
        assert_eq!(controller.scroll_speed(), 5.0);
        assert_eq!(controller.current_level(), 1);
    }
}
