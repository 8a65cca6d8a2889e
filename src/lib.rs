//! Flap Arena - a wrap-around arena flap-and-pounce arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machines, collisions, spawning)
//! - `game`: Host facade (input ingestion, lifecycle, event callback)
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod sim;
pub mod tuning;

pub use game::{Game, GameEvent, GameKey};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (frames per second)
    pub const FRAME_HZ: u32 = 30;

    /// Arena dimensions in pixels, y increasing downward
    pub const ARENA_WIDTH: i32 = 640;
    pub const ARENA_HEIGHT: i32 = 460;
    /// Ceiling line; fatal to the player, a bounce for enemies
    pub const ROOF_LINE: i32 = 2;
    /// Molten floor line; fatal to everything that touches it
    pub const LAVA_LINE: i32 = 436;

    /// Fixed capacity of the enemy slot array
    pub const MAX_ENEMIES: usize = 8;

    /// Sprite extents
    pub const PLAYER_WIDTH: i32 = 48;
    pub const PLAYER_HEIGHT: i32 = 37;
    pub const ENEMY_WIDTH: i32 = 44;
    pub const ENEMY_HEIGHT: i32 = 36;
    pub const EGG_WIDTH: i32 = 24;
    pub const EGG_HEIGHT: i32 = 21;

    /// Player respawn point (top-left), feet exactly on the low center
    /// ledge's strip top
    pub const PLAYER_START_H: i32 = 296;
    pub const PLAYER_START_V: i32 = 328;

    /// Frames of enemy materialization animation
    pub const SPAWN_ANIM_FRAMES: i32 = 32;
}
