//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Fixed entity-slot iteration order
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod geom;
pub mod hand;
pub mod level;
pub mod player;
pub mod state;
pub mod tick;

pub use geom::{Pt, Rect};
pub use state::{
    Enemy, EnemyKind, EnemyMode, GameEvent, GamePhase, GameState, Hand, HandMode, Player,
    PlayerMode,
};
pub use tick::{FrameInput, STARTING_LIVES, end_game, new_game, set_up_level, tick};
