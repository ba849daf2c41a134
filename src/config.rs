use crate::error::{Result, TilemapError};
use crate::tiles::{Level, Seed, DEFAULT_OVERLAP_HEIGHT, MAP_HEIGHT};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunables for generation, scrolling and tile updates.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilemapConfig {
    /// Base seed every level seed is derived from.
    pub base_seed: Seed,
    /// Level placed at startup and used as the scroll controller's start.
    pub initial_level: Level,
    /// Scroll speed in tiles per second.
    pub scroll_speed: f32,
    /// Distance the scroll parent travels per scroll, in tiles.
    pub scroll_distance: f32,
    /// Rows at the bottom of a new level checked for protected tiles.
    pub overlap_height: usize,
    /// Seconds between automatic scrolls, `None` disables autoscroll.
    pub auto_scroll_interval: Option<f32>,
    /// Seconds between rock-fall passes over the current level.
    pub rock_update_interval: Option<f32>,
    /// Whether the player passability table lets actors into Sky.
    pub sky_passable_for_player: bool,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            base_seed: 12345,
            initial_level: 1,
            scroll_speed: 5.0,
            scroll_distance: MAP_HEIGHT as f32,
            overlap_height: DEFAULT_OVERLAP_HEIGHT,
            auto_scroll_interval: Some(3.0),
            rock_update_interval: Some(2.0),
            sky_passable_for_player: true,
        }
    }
}

impl TilemapConfig {
    /// Parse a config from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| TilemapError::InvalidConfig(e.to_string()))
    }
}
