//! Vertically scrolling, seed-deterministic tilemap for a digging game.
//!
//! Levels are generated from `(base_seed, level)`, placed as tile instances,
//! stacked below each other as the map scrolls, and evicted outside a small
//! window around the current level.

pub mod config;
pub mod entities;
pub mod error;
pub mod tiles;
pub mod world;

pub use config::TilemapConfig;
pub use error::{Result, TilemapError};
pub use world::TilemapPlugin;
