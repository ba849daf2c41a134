use super::events::ScrollEvent;
use super::generator::LevelSource;
use super::manager::TilemapService;
use super::trigger::TriggerSignal;
use crate::config::TilemapConfig;
use crate::error::{Result, TilemapError};
use crate::tiles::{Level, Seed, DEFAULT_OVERLAP_HEIGHT, MAP_HEIGHT};
use bevy::prelude::*;
use crossbeam_channel::Receiver;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScrollPhase {
    Idle,
    /// Next tick places the next level, generating it if needed
    Generating,
    Animating {
        start: Vec3,
        target: Vec3,
        elapsed: f32,
        duration: f32,
    },
}

/// Moves the tilemap root down one level at a time.
///
/// A scroll is a small state machine advanced by [`ScrollController::tick`]
/// once per frame: the first tick after [`ScrollController::start_scroll`]
/// generates and places the next level below the current one, later ticks
/// interpolate the root upward until it reaches the target. Only one scroll
/// runs at a time.
#[derive(Resource)]
pub struct ScrollController {
    source: Box<dyn LevelSource>,
    base_seed: Seed,
    current_level: Level,
    scroll_speed: f32,
    scroll_distance: f32,
    overlap_height: usize,
    phase: ScrollPhase,
    trigger: Option<Receiver<TriggerSignal>>,
    events: Vec<ScrollEvent>,
}

impl ScrollController {
    pub fn builder() -> ScrollControllerBuilder {
        ScrollControllerBuilder::default()
    }

    pub fn current_level(&self) -> Level {
        self.current_level
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn scroll_distance(&self) -> f32 {
        self.scroll_distance
    }

    pub fn base_seed(&self) -> Seed {
        self.base_seed
    }

    pub fn is_scrolling(&self) -> bool {
        self.phase != ScrollPhase::Idle
    }

    pub fn set_scroll_speed(&mut self, speed: f32) {
        if speed.is_nan() || speed <= 0.0 {
            warn!("Ignoring non-positive scroll speed {}", speed);
            return;
        }
        self.scroll_speed = speed;
    }

    pub fn set_scroll_distance(&mut self, distance: f32) {
        if distance.is_nan() || distance <= 0.0 {
            warn!("Ignoring non-positive scroll distance {}", distance);
            return;
        }
        self.scroll_distance = distance;
    }

    pub fn set_current_level(&mut self, level: Level) {
        if level < 1 {
            warn!("Ignoring current level {} (levels start at 1)", level);
            return;
        }
        self.current_level = level;
    }

    /// Begin a scroll. Returns `false` if one is already running.
    pub fn start_scroll(&mut self) -> bool {
        if self.is_scrolling() {
            warn!("Scroll already in progress from level {}", self.current_level);
            return false;
        }

        info!("Scroll started from level {}", self.current_level);
        self.phase = ScrollPhase::Generating;
        self.events.push(ScrollEvent::Started(self.current_level));
        true
    }

    /// Advance a running scroll by one frame.
    ///
    /// `root` is the translation of the tilemap root. On error the scroll is
    /// abandoned, the controller is idle again and the error is returned.
    pub fn tick(
        &mut self,
        delta_secs: f32,
        service: &mut TilemapService,
        root: &mut Vec3,
    ) -> Result<()> {
        if self.phase == ScrollPhase::Generating {
            let generated = match self.prepare_next_level(service) {
                Ok(generated) => generated,
                Err(err) => {
                    self.phase = ScrollPhase::Idle;
                    error!(
                        "Scroll from level {} failed: {}",
                        self.current_level, err
                    );
                    return Err(err);
                }
            };
            self.phase = ScrollPhase::Animating {
                start: *root,
                target: *root + Vec3::Y * self.scroll_distance,
                elapsed: 0.0,
                duration: self.scroll_distance / self.scroll_speed,
            };
            // Generation takes the whole frame; a resident level animates at once
            if generated {
                return Ok(());
            }
        }

        if let ScrollPhase::Animating {
            start,
            target,
            elapsed,
            duration,
        } = self.phase
        {
            let elapsed = elapsed + delta_secs;
            if elapsed >= duration {
                *root = target;
                self.finish_scroll(service);
            } else {
                *root = start.lerp(target, elapsed / duration);
                self.phase = ScrollPhase::Animating {
                    start,
                    target,
                    elapsed,
                    duration,
                };
            }
        }
        Ok(())
    }

    /// Place the next level below the current one. Returns `false` when it
    /// was already resident.
    fn prepare_next_level(&mut self, service: &mut TilemapService) -> Result<bool> {
        let next = self.current_level + 1;
        if service.is_map_loaded(next) {
            debug!("Level {} already loaded, skipping generation", next);
            return Ok(false);
        }

        let map = self.source.generate_map(next, self.base_seed)?;

        let origin = service.resolved_origin(self.current_level) - Vec3::Y * MAP_HEIGHT as f32;
        service.place_tiles_with_overlap_protection_at(map, self.overlap_height, origin);

        info!("Generated level {} below level {}", next, self.current_level);
        self.events.push(ScrollEvent::NewLevelGenerated(next));
        Ok(true)
    }

    fn finish_scroll(&mut self, service: &mut TilemapService) {
        self.current_level += 1;
        service.optimize_memory(self.current_level);
        self.phase = ScrollPhase::Idle;
        info!("Scroll completed, now on level {}", self.current_level);
        self.events.push(ScrollEvent::Completed(self.current_level));
    }

    /// Listen to `trigger`, dropping any previously registered one
    pub fn register_trigger(&mut self, trigger: Receiver<TriggerSignal>) {
        if self.trigger.replace(trigger).is_some() {
            debug!("Replaced previous scroll trigger");
        }
    }

    pub fn unregister_trigger(&mut self) {
        self.trigger = None;
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    /// React to every signal the registered trigger sent since the last poll
    pub fn poll_triggers(&mut self) {
        let signals: Vec<TriggerSignal> = match &self.trigger {
            Some(receiver) => receiver.try_iter().collect(),
            None => return,
        };

        for signal in signals {
            match signal {
                TriggerSignal::Started => {
                    if !self.is_scrolling() {
                        self.start_scroll();
                    }
                }
                TriggerSignal::PositionChanged(position) => {
                    let threshold = self.current_level as f32 * self.scroll_distance;
                    if position >= threshold && !self.is_scrolling() {
                        self.start_scroll();
                    }
                }
                TriggerSignal::Completed => debug!("Scroll trigger completed"),
            }
        }
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<ScrollEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Builder for [`ScrollController`]. The level source is required.
pub struct ScrollControllerBuilder {
    source: Option<Box<dyn LevelSource>>,
    base_seed: Seed,
    current_level: Level,
    scroll_speed: f32,
    scroll_distance: f32,
    overlap_height: usize,
}

impl Default for ScrollControllerBuilder {
    fn default() -> Self {
        let config = TilemapConfig::default();
        Self {
            source: None,
            base_seed: config.base_seed,
            current_level: config.initial_level,
            scroll_speed: config.scroll_speed,
            scroll_distance: config.scroll_distance,
            overlap_height: DEFAULT_OVERLAP_HEIGHT,
        }
    }
}

impl ScrollControllerBuilder {
    pub fn level_source(mut self, source: impl LevelSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn base_seed(mut self, seed: Seed) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn current_level(mut self, level: Level) -> Self {
        self.current_level = level;
        self
    }

    pub fn scroll_speed(mut self, speed: f32) -> Self {
        self.scroll_speed = speed;
        self
    }

    pub fn scroll_distance(mut self, distance: f32) -> Self {
        self.scroll_distance = distance;
        self
    }

    pub fn overlap_height(mut self, rows: usize) -> Self {
        self.overlap_height = rows;
        self
    }

    /// Take every tunable from `config`
    pub fn config(self, config: &TilemapConfig) -> Self {
        self.base_seed(config.base_seed)
            .current_level(config.initial_level)
            .scroll_speed(config.scroll_speed)
            .scroll_distance(config.scroll_distance)
            .overlap_height(config.overlap_height)
    }

    /// Invalid speed, distance or level values are logged and replaced by
    /// their defaults.
    pub fn build(self) -> Result<ScrollController> {
        let source = self
            .source
            .ok_or(TilemapError::MissingRequired("level source"))?;
        let defaults = TilemapConfig::default();

        let mut controller = ScrollController {
            source,
            base_seed: self.base_seed,
            current_level: defaults.initial_level,
            scroll_speed: defaults.scroll_speed,
            scroll_distance: defaults.scroll_distance,
            overlap_height: self.overlap_height,
            phase: ScrollPhase::Idle,
            trigger: None,
            events: Vec::new(),
        };
        controller.set_current_level(self.current_level);
        controller.set_scroll_speed(self.scroll_speed);
        controller.set_scroll_distance(self.scroll_distance);
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{MapData, TileGrid, TileKind, MAP_WIDTH};
    use crate::world::generator::TilemapGenerator;
    use crate::world::trigger::{scroll_trigger_channel, SimpleScrollTrigger};

    struct FailingSource;

    impl LevelSource for FailingSource {
        fn generate_map(&mut self, _level: Level, _seed: Seed) -> Result<MapData> {
            Err(TilemapError::InvalidDimensions {
                width: 0,
                height: 0,
            })
        }

        fn seed_for_level(&self, level: Level) -> Seed {
            level as Seed
        }
    }

    fn controller() -> ScrollController {
        ScrollController::builder()
            .level_source(TilemapGenerator::default())
            .base_seed(12345)
            .build()
            .unwrap()
    }

    fn service_with_level_one() -> TilemapService {
        let mut service = TilemapService::default();
        service.place_tiles(TilemapGenerator::default().generate_map(1, 12345).unwrap());
        service.drain_events();
        service
    }

    fn run_to_idle(
        controller: &mut ScrollController,
        service: &mut TilemapService,
        root: &mut Vec3,
    ) {
        for _ in 0..1000 {
            if !controller.is_scrolling() {
                return;
            }
            controller.tick(0.5, service, root).unwrap();
        }
        panic!("scroll never finished");
    }

    #[test]
    fn test_builder_requires_source() {
        let err = ScrollController::builder().build().err();
        assert_eq!(err, Some(TilemapError::MissingRequired("level source")));
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        let controller = ScrollController::builder()
            .level_source(TilemapGenerator::default())
            .scroll_speed(-1.0)
            .scroll_distance(0.0)
            .current_level(0)
            .build()
            .unwrap();

        assert_eq!(controller.scroll_speed(), 5.0);
        assert_eq!(controller.scroll_distance(), MAP_HEIGHT as f32);
        assert_eq!(controller.current_level(), 1);
    }

    #[test]
    fn test_setters_validate() {
        let mut controller = controller();

        controller.set_scroll_speed(0.0);
        controller.set_scroll_speed(f32::NAN);
        controller.set_scroll_distance(-5.0);
        controller.set_current_level(0);
        assert_eq!(controller.scroll_speed(), 5.0);
        assert_eq!(controller.scroll_distance(), MAP_HEIGHT as f32);
        assert_eq!(controller.current_level(), 1);

        controller.set_scroll_speed(12.0);
        controller.set_scroll_distance(10.0);
        controller.set_current_level(4);
        assert_eq!(controller.scroll_speed(), 12.0);
        assert_eq!(controller.scroll_distance(), 10.0);
        assert_eq!(controller.current_level(), 4);
    }

    #[test]
    fn test_full_scroll_cycle() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;

        assert!(controller.start_scroll());
        assert!(controller.is_scrolling());

        // First tick generates and places level 2 below level 1.
        controller.tick(0.0, &mut service, &mut root).unwrap();
        assert!(service.is_map_loaded(2));
        for tile in service.get_tiles_for_level(2).unwrap() {
            let placed = service.get_position(tile.grid.x, tile.grid.y);
            assert_eq!(tile.position, placed - Vec3::Y * MAP_HEIGHT as f32);
        }
        assert_eq!(root, Vec3::ZERO);

        controller.tick(3.0, &mut service, &mut root).unwrap();
        assert_eq!(root, Vec3::new(0.0, 15.0, 0.0));
        assert!(controller.is_scrolling());

        run_to_idle(&mut controller, &mut service, &mut root);

        assert_eq!(controller.current_level(), 2);
        assert!(!controller.is_scrolling());
        assert_eq!(root, Vec3::new(0.0, MAP_HEIGHT as f32, 0.0));
        assert_eq!(
            controller.drain_events(),
            vec![
                ScrollEvent::Started(1),
                ScrollEvent::NewLevelGenerated(2),
                ScrollEvent::Completed(2),
            ]
        );
    }

    #[test]
    fn test_levels_stack_without_gaps() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;

        for _ in 0..3 {
            controller.start_scroll();
            run_to_idle(&mut controller, &mut service, &mut root);
        }

        assert_eq!(controller.current_level(), 4);
        assert_eq!(service.level_origin(2), Some(Vec3::new(0.0, -30.0, 0.0)));
        assert_eq!(service.level_origin(3), Some(Vec3::new(0.0, -60.0, 0.0)));
        assert_eq!(service.level_origin(4), Some(Vec3::new(0.0, -90.0, 0.0)));
        assert_eq!(root, Vec3::new(0.0, 90.0, 0.0));
        assert_eq!(service.loaded_levels(), vec![2, 3, 4]);
    }

    #[test]
    fn test_generated_level_uses_base_seed() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;

        controller.start_scroll();
        run_to_idle(&mut controller, &mut service, &mut root);

        let expected = TilemapGenerator::default().generate_map(2, 12345).unwrap();
        assert_eq!(service.get_loaded_map(2), expected);
    }

    #[test]
    fn test_start_guard() {
        let mut controller = controller();
        assert!(controller.start_scroll());
        assert!(!controller.start_scroll());
        assert_eq!(controller.drain_events(), vec![ScrollEvent::Started(1)]);
    }

    #[test]
    fn test_already_loaded_level_is_reused() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let grid = TileGrid::filled(MAP_WIDTH, MAP_HEIGHT, TileKind::Treasure).unwrap();
        service.place_tiles(MapData::new(grid, 1, 2));
        let mut root = Vec3::ZERO;

        controller.start_scroll();
        run_to_idle(&mut controller, &mut service, &mut root);

        assert_eq!(service.get_block_type_at(IVec2::new(3, 3), 2), TileKind::Treasure);
        assert_eq!(service.level_origin(2), Some(Vec3::ZERO));
        assert_eq!(
            controller.drain_events(),
            vec![ScrollEvent::Started(1), ScrollEvent::Completed(2)]
        );
    }

    #[test]
    fn test_resident_level_animates_on_first_tick() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let grid = TileGrid::filled(MAP_WIDTH, MAP_HEIGHT, TileKind::Empty).unwrap();
        service.place_tiles(MapData::new(grid, 1, 2));
        let mut root = Vec3::ZERO;

        controller.start_scroll();
        controller.tick(3.0, &mut service, &mut root).unwrap();

        assert_eq!(root, Vec3::new(0.0, 15.0, 0.0));
    }

    #[test]
    fn test_every_level_placed_whole_below_the_last() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;

        // Well past the point where level 1 is evicted
        for _ in 0..7 {
            controller.start_scroll();
            controller.tick(0.0, &mut service, &mut root).unwrap();

            let current = controller.current_level();
            let next = current + 1;
            let floor = service.resolved_origin(current).y;
            let placed = service.get_tiles_for_level(next).unwrap();
            assert_eq!(placed.len(), MAP_WIDTH * MAP_HEIGHT, "level {next}");
            assert!(placed.iter().all(|tile| tile.position.y < floor));

            run_to_idle(&mut controller, &mut service, &mut root);
        }

        assert_eq!(controller.current_level(), 8);
        assert!(!service.is_map_loaded(1));

        // No two walls share a position across the resident levels
        let walls: Vec<Vec3> = service
            .all_tiles()
            .filter(|tile| tile.is_protected())
            .map(|tile| tile.position)
            .collect();
        for (i, a) in walls.iter().enumerate() {
            assert!(walls[i + 1..].iter().all(|b| a.truncate() != b.truncate()));
        }
    }

    #[test]
    fn test_overlap_band_protects_preplaced_tiles() {
        let mut controller = controller();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;
        controller.start_scroll();
        run_to_idle(&mut controller, &mut service, &mut root);

        // A rock level sitting exactly where level 3 will go
        let rocks = TileGrid::filled(MAP_WIDTH, MAP_HEIGHT, TileKind::Rock).unwrap();
        service.place_tiles(MapData::new(rocks, 1, 9));
        service.offset_level(9, Vec3::new(0.0, -60.0, 0.0));

        controller.start_scroll();
        controller.tick(0.0, &mut service, &mut root).unwrap();

        let placed = service.get_tiles_for_level(3).unwrap();
        assert_eq!(
            placed.len(),
            MAP_WIDTH * (MAP_HEIGHT - DEFAULT_OVERLAP_HEIGHT)
        );
        assert!(placed
            .iter()
            .all(|tile| tile.grid.y >= DEFAULT_OVERLAP_HEIGHT as i32));
    }

    #[test]
    fn test_failure_releases_scroll() {
        let mut controller = ScrollController::builder()
            .level_source(FailingSource)
            .build()
            .unwrap();
        let mut service = service_with_level_one();
        let mut root = Vec3::ZERO;

        controller.start_scroll();
        let result = controller.tick(0.016, &mut service, &mut root);

        assert!(result.is_err());
        assert!(!controller.is_scrolling());
        assert_eq!(controller.current_level(), 1);
        assert_eq!(root, Vec3::ZERO);

        // A later scroll may start again.
        assert!(controller.start_scroll());
    }

    #[test]
    fn test_trigger_started_begins_scroll() {
        let mut controller = controller();
        let mut trigger = SimpleScrollTrigger::new(10.0, 30.0);
        controller.register_trigger(trigger.subscribe());

        trigger.trigger();
        controller.poll_triggers();

        assert!(controller.is_scrolling());
    }

    #[test]
    fn test_trigger_position_threshold() {
        let mut controller = controller();
        let (sender, receiver) = scroll_trigger_channel();
        controller.register_trigger(receiver);

        sender.send(TriggerSignal::PositionChanged(29.0)).unwrap();
        controller.poll_triggers();
        assert!(!controller.is_scrolling());

        sender.send(TriggerSignal::PositionChanged(30.0)).unwrap();
        controller.poll_triggers();
        assert!(controller.is_scrolling());
    }

    #[test]
    fn test_register_replaces_previous_trigger() {
        let mut controller = controller();
        let (old_sender, old_receiver) = scroll_trigger_channel();
        let (_new_sender, new_receiver) = scroll_trigger_channel();

        controller.register_trigger(old_receiver);
        controller.register_trigger(new_receiver);

        assert!(old_sender.send(TriggerSignal::Started).is_err());
        controller.poll_triggers();
        assert!(!controller.is_scrolling());

        controller.unregister_trigger();
        assert!(!controller.has_trigger());
    }
}
