use super::events::TilemapEvent;
use crate::tiles::{
    DefaultTileBehavior, Level, MapData, TileBehavior, TileHandle, TileInstance, TileKind,
    MAP_HEIGHT, MEMORY_WINDOW,
};
use bevy::prelude::*;
use std::collections::HashMap;

/// Everything resident for one level: its data, its placed tiles and where
/// those tiles sit under the tilemap root.
struct LoadedLevel {
    map: MapData,
    tiles: Vec<TileInstance>,
    origin: Vec3,
}

/// Owns all loaded levels and their tile instances.
///
/// This is the only writer of tile state. Consumers mutate through
/// [`TilemapService::place_tiles`], [`TilemapService::on_player_hit_tile`] and
/// friends, and collect notifications with [`TilemapService::drain_events`].
#[derive(Resource)]
pub struct TilemapService {
    levels: HashMap<Level, LoadedLevel>,
    behavior: Box<dyn TileBehavior>,
    next_handle: u64,
    events: Vec<TilemapEvent>,
}

impl TilemapService {
    pub fn new(behavior: impl TileBehavior + 'static) -> Self {
        Self {
            levels: HashMap::new(),
            behavior: Box::new(behavior),
            next_handle: 0,
            events: Vec::new(),
        }
    }

    /// Instantiate one tile per cell of `map`, replacing the level if present
    pub fn place_tiles(&mut self, map: MapData) {
        self.place(map, None, Vec3::ZERO);
    }

    /// Like [`Self::place_tiles`], but cells in the bottom `overlap_height`
    /// rows are skipped where a protected tile from any level already sits.
    pub fn place_tiles_with_overlap_protection(&mut self, map: MapData, overlap_height: usize) {
        self.place(map, Some(overlap_height), Vec3::ZERO);
    }

    /// Overlap-protected placement of a level whose tiles start at `origin`.
    /// The band is checked where each tile will actually sit.
    pub fn place_tiles_with_overlap_protection_at(
        &mut self,
        map: MapData,
        overlap_height: usize,
        origin: Vec3,
    ) {
        self.place(map, Some(overlap_height), origin);
    }

    fn place(&mut self, map: MapData, overlap_height: Option<usize>, origin: Vec3) {
        let level = map.level();
        if self.levels.contains_key(&level) {
            self.clear_tiles(level);
        }

        let mut tiles = Vec::with_capacity(map.width() * map.height());
        let mut protected_skips = 0;

        for (grid, kind) in map.tiles().iter() {
            let position = origin + self.get_position(grid.x, grid.y);
            let in_band = overlap_height.is_some_and(|rows| (grid.y as usize) < rows);
            if in_band && self.is_protected_tile_at(position) {
                debug!("Protected existing tile at {} while placing level {}", grid, level);
                protected_skips += 1;
                continue;
            }

            let handle = TileHandle(self.next_handle);
            self.next_handle += 1;
            let mut tile = TileInstance::new(handle, kind, level, grid);
            tile.position = position;
            tiles.push(tile);
        }

        info!(
            "Placed level {} ({} tiles, {} protected cells skipped)",
            level,
            tiles.len(),
            protected_skips
        );

        self.levels.insert(
            level,
            LoadedLevel {
                map: map.clone(),
                tiles,
                origin,
            },
        );
        self.events.push(TilemapEvent::MapGenerated(map));
    }

    fn is_protected_tile_at(&self, position: Vec3) -> bool {
        self.levels
            .values()
            .flat_map(|loaded| loaded.tiles.iter())
            .any(|tile| tile.is_protected() && tile.occupies(position))
    }

    /// Drop a level's data and tiles. Absent levels are ignored.
    pub fn clear_tiles(&mut self, level: Level) {
        if let Some(loaded) = self.levels.remove(&level) {
            info!("Cleared level {} ({} tiles)", level, loaded.tiles.len());
        }
    }

    /// Evict every level more than two away from `current_level`
    pub fn optimize_memory(&mut self, current_level: Level) {
        let far: Vec<Level> = self
            .levels
            .keys()
            .copied()
            .filter(|level| (level - current_level).abs() > MEMORY_WINDOW)
            .collect();

        for level in far {
            self.clear_tiles(level);
        }

        self.events.push(TilemapEvent::MemoryOptimized(current_level));
    }

    pub fn is_map_loaded(&self, level: Level) -> bool {
        self.levels.contains_key(&level)
    }

    /// Stored map for `level`, or an empty default when not loaded
    pub fn get_loaded_map(&self, level: Level) -> MapData {
        self.loaded_map(level).cloned().unwrap_or_default()
    }

    pub fn loaded_map(&self, level: Level) -> Option<&MapData> {
        self.levels.get(&level).map(|loaded| &loaded.map)
    }

    pub fn get_tiles_for_level(&self, level: Level) -> Option<&[TileInstance]> {
        self.levels.get(&level).map(|loaded| loaded.tiles.as_slice())
    }

    /// Every resident tile across all levels
    pub fn all_tiles(&self) -> impl Iterator<Item = &TileInstance> + '_ {
        self.levels.values().flat_map(|loaded| loaded.tiles.iter())
    }

    /// Loaded levels in ascending order
    pub fn loaded_levels(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.levels.keys().copied().collect();
        levels.sort_unstable();
        levels
    }

    /// Kind at `position`, `Empty` when the level is absent or out of bounds
    pub fn get_block_type_at(&self, position: IVec2, level: Level) -> TileKind {
        self.loaded_map(level)
            .and_then(|map| map.tile(position))
            .unwrap_or(TileKind::Empty)
    }

    /// Passability through the tile behavior's table.
    ///
    /// Unloaded levels are open; out-of-bounds cells are closed.
    pub fn can_player_pass_through(&self, position: IVec2, level: Level) -> bool {
        let Some(map) = self.loaded_map(level) else {
            return true;
        };
        match map.tile(position) {
            Some(kind) => self.behavior.can_player_pass_through(kind),
            None => false,
        }
    }

    /// Shared passability rule: only Empty, Ground and Treasure are open.
    ///
    /// Unloaded levels are open; out-of-bounds cells are closed. Sky blocks
    /// here regardless of the tile behavior.
    pub fn can_pass_through(&self, position: IVec2, level: Level) -> bool {
        let Some(map) = self.loaded_map(level) else {
            return true;
        };
        matches!(
            map.tile(position),
            Some(TileKind::Empty | TileKind::Ground | TileKind::Treasure)
        )
    }

    /// Apply the hit rule to one tile, replacing the level's map if it changed
    pub fn on_player_hit_tile(&mut self, position: IVec2, level: Level) {
        let Some(loaded) = self.levels.get_mut(&level) else {
            return;
        };
        let Some(old_kind) = loaded.map.tile(position) else {
            return;
        };

        let outcome = self.behavior.on_player_hit(old_kind, position);
        if outcome.new_kind == old_kind {
            return;
        }

        loaded.map = loaded.map.with_tile(position, outcome.new_kind);
        if let Some(tile) = loaded.tiles.iter_mut().find(|tile| tile.grid == position) {
            tile.set_kind(outcome.new_kind);
        }

        debug!(
            "Tile {} on level {} hit: {} -> {} (+{})",
            position, level, old_kind, outcome.new_kind, outcome.score_gained
        );
        self.events.push(TilemapEvent::TileHit {
            position,
            old_kind,
            score_gained: outcome.score_gained,
        });
    }

    /// Run the time-based tile rules over every cell of `level`
    pub fn update_tiles_with_time(&mut self, level: Level, delta_secs: f32) {
        let Some(loaded) = self.levels.get_mut(&level) else {
            return;
        };

        let mut grid = loaded.map.tiles().clone();
        for x in 0..grid.width() as i32 {
            for y in 0..grid.height() as i32 {
                self.behavior
                    .on_time_update(IVec2::new(x, y), &mut grid, delta_secs);
            }
        }

        if &grid == loaded.map.tiles() {
            return;
        }

        for tile in loaded.tiles.iter_mut() {
            if let Some(kind) = grid.get(tile.grid) {
                if kind != tile.kind() {
                    tile.set_kind(kind);
                }
            }
        }
        loaded.map = loaded.map.with_grid(grid);
        self.events.push(TilemapEvent::TilesUpdated(level));
    }

    /// Local position of grid cell `(x, y)` before any level offset
    pub fn get_position(&self, x: i32, y: i32) -> Vec3 {
        Vec3::new(x as f32, y as f32, 0.0)
    }

    /// Move every tile of `level` by `offset`
    pub fn offset_level(&mut self, level: Level, offset: Vec3) {
        if let Some(loaded) = self.levels.get_mut(&level) {
            for tile in loaded.tiles.iter_mut() {
                tile.position += offset;
            }
            loaded.origin += offset;
        }
    }

    /// Total offset applied to `level` since it was placed
    pub fn level_origin(&self, level: Level) -> Option<Vec3> {
        self.levels.get(&level).map(|loaded| loaded.origin)
    }

    /// Recorded origin of `level`, or where stacking from level 1 would put it
    pub fn resolved_origin(&self, level: Level) -> Vec3 {
        self.level_origin(level)
            .unwrap_or_else(|| Vec3::new(0.0, -((level - 1) as f32) * MAP_HEIGHT as f32, 0.0))
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Take all notifications raised since the last drain
    pub fn drain_events(&mut self) -> Vec<TilemapEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> TilemapStats {
        TilemapStats {
            loaded_levels: self.loaded_levels(),
            tile_instances: self.all_tiles().count(),
            protected_instances: self.all_tiles().filter(|tile| tile.is_protected()).count(),
        }
    }
}

impl Default for TilemapService {
    fn default() -> Self {
        Self::new(DefaultTileBehavior::new())
    }
}

/// Statistics about the resident tilemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilemapStats {
    pub loaded_levels: Vec<Level>,
    pub tile_instances: usize,
    pub protected_instances: usize,
}

impl std::fmt::Display for TilemapStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Levels: {:?}, Tiles: {}, Protected: {}",
            self.loaded_levels, self.tile_instances, self.protected_instances
        )
    }
}
