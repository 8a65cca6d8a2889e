//! Game state and core simulation types
//!
//! All state that must be persisted for determinism lives here. The
//! whole simulation is one `GameState` value owned by the orchestrator;
//! nothing reads or writes it outside a frame step.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run active; entities hold their last pose for the attract view
    Attract,
    /// A run is in progress
    Playing,
}

/// Lifecycle events delivered to the host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Ended,
}

/// Player state machine modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    Idle,
    Walking,
    Flying,
    /// Descending too fast for the last flap to matter
    Sinking,
    /// Off a ledge with no lift; steering is gone until the next flap
    Falling,
    /// Dead; the remains tumble out of the arena before life loss runs
    Bones,
}

/// Enemy state machine modes. `Idle` is the empty-slot sentinel: a live
/// slot never carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMode {
    Idle,
    Spawning,
    Flying,
    Walking,
    /// Lethally hit; tumbling toward a ledge or the lava
    Falling,
    Egg,
}

/// Enemy species. Attributes come from the tuning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Wolf,
    Jackal,
    /// Countdown-timer penalty spawn; uncounted and eggless
    Owl,
}

/// The player entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub dest: Rect,
    /// Last committed rect; immutable for the remainder of the frame
    pub was_dest: Rect,
    /// Opposite-edge copy while straddling an arena edge
    pub wrap: Rect,
    pub h: i32,
    pub v: i32,
    pub was_h: i32,
    pub was_v: i32,
    pub h_vel: i32,
    pub v_vel: i32,
    /// Sprite sheet row
    pub src_num: i32,
    pub frame: i32,
    pub mode: PlayerMode,
    pub facing_right: bool,
    pub flapping: bool,
    pub walking: bool,
    /// Set by a wrap teleport; suppresses collision checks one frame
    pub wrapping: bool,
    /// In a grab this frame: clutching an enemy, or held by the hand
    pub clutched: bool,
}

impl Player {
    /// A player standing at the fixed start point
    pub fn at_start() -> Self {
        let dest = Rect::sized(PLAYER_START_H, PLAYER_START_V, PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            dest,
            was_dest: dest,
            wrap: dest,
            h: PLAYER_START_H,
            v: PLAYER_START_V,
            was_h: PLAYER_START_H,
            was_v: PLAYER_START_V,
            h_vel: 0,
            v_vel: 0,
            src_num: 0,
            frame: 0,
            mode: PlayerMode::Idle,
            facing_right: true,
            flapping: false,
            walking: false,
            wrapping: false,
            clutched: false,
        }
    }

    /// Rebuild `dest` from the authoritative position
    pub fn sync_dest(&mut self) {
        self.dest = Rect::sized(self.h, self.v, PLAYER_WIDTH, PLAYER_HEIGHT);
    }

    /// Snapshot the previous-frame fields before any mutation
    pub fn begin_frame(&mut self) {
        self.was_dest = self.dest;
        self.was_h = self.h;
        self.was_v = self.v;
    }

    pub fn airborne(&self) -> bool {
        matches!(
            self.mode,
            PlayerMode::Flying | PlayerMode::Sinking | PlayerMode::Falling
        )
    }
}

/// One enemy slot in the fixed arena array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub dest: Rect,
    pub was_dest: Rect,
    pub h: i32,
    pub v: i32,
    pub was_h: i32,
    pub was_v: i32,
    pub h_vel: i32,
    pub v_vel: i32,
    pub src_num: i32,
    pub frame: i32,
    pub kind: EnemyKind,
    pub mode: EnemyMode,
    /// Vertical range within which a strip below is sensed for landing
    pub height_smell: i32,
    /// Altitude currently sought while flying
    pub target_alt: i32,
    pub flap_impulse: i32,
    /// Multi-purpose countdown: spawn animation, walk cooldown, hatch
    pub pass: i32,
    pub max_h_vel: i32,
    pub max_v_vel: i32,
    pub facing_right: bool,
    /// Whether this slot participates in level kill accounting
    pub counted: bool,
}

impl Enemy {
    /// An unoccupied slot
    pub fn empty() -> Self {
        Self {
            dest: Rect::default(),
            was_dest: Rect::default(),
            h: 0,
            v: 0,
            was_h: 0,
            was_v: 0,
            h_vel: 0,
            v_vel: 0,
            src_num: 0,
            frame: 0,
            kind: EnemyKind::Wolf,
            mode: EnemyMode::Idle,
            height_smell: 0,
            target_alt: 0,
            flap_impulse: 0,
            pass: 0,
            max_h_vel: 0,
            max_v_vel: 0,
            facing_right: true,
            counted: false,
        }
    }

    /// True for every mode except the empty-slot sentinel
    pub fn is_live(&self) -> bool {
        self.mode != EnemyMode::Idle
    }

    /// Rebuild `dest` from the authoritative position; eggs are smaller
    pub fn sync_dest(&mut self) {
        let (w, h) = if self.mode == EnemyMode::Egg {
            (EGG_WIDTH, EGG_HEIGHT)
        } else {
            (ENEMY_WIDTH, ENEMY_HEIGHT)
        };
        self.dest = Rect::sized(self.h, self.v, w, h);
    }

    pub fn begin_frame(&mut self) {
        self.was_dest = self.dest;
        self.was_h = self.h;
        self.was_v = self.v;
    }
}

/// Hand state machine modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandMode {
    Idle,
    /// Rising out of the lava toward the player
    Reaching,
    /// Holding the player
    Clutching,
}

/// The lava-hand grab actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub dest: Rect,
    pub mode: HandMode,
    /// Fixed zone over the lava pit that wakes the hand
    pub grab_zone: Rect,
}

/// Hand sprite extents
pub const HAND_WIDTH: i32 = 42;
pub const HAND_HEIGHT: i32 = 37;

/// Parked (submerged) hand position, centered over the lava pit
pub const HAND_HOME: Rect = Rect::sized(299, LAVA_LINE + 4, HAND_WIDTH, HAND_HEIGHT);

impl Default for Hand {
    fn default() -> Self {
        Self {
            dest: HAND_HOME,
            mode: HandMode::Idle,
            grab_zone: Rect::new(154, 386, 486, LAVA_LINE),
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The only entropy source in the simulation
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation frame counter
    pub time_frames: u64,
    pub even_frame: bool,
    pub player: Player,
    /// Fixed slot arena; spawning claims a free index, death frees it
    pub enemies: [Enemy; MAX_ENEMIES],
    pub hand: Hand,
    the_score: u64,
    pub lives_left: u32,
    pub level_on: u32,
    pub num_ledges: usize,
    /// Live slots right now
    pub num_enemies: u32,
    /// Total scheduled for this level
    pub num_enemies_this_level: u32,
    /// Counted enemies eliminated for good this level
    pub dead_enemies: u32,
    /// Owls alive right now
    pub num_owls: u32,
    /// Counted enemies introduced so far this level
    pub spawned_enemies: u32,
    pub count_down_timer: i32,
    /// Earliest frame the next scheduled spawn may claim a slot
    pub next_spawn_frame: u64,
    /// Consecutive frames a spawn has been deferred for lack of a pad
    pub spawn_retry_frames: u32,
    /// Lifecycle events pending delivery to the host
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a state with the given seed and the shipped balance
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::standard())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Attract,
            time_frames: 0,
            even_frame: false,
            player: Player::at_start(),
            enemies: [Enemy::empty(); MAX_ENEMIES],
            hand: Hand::default(),
            the_score: 0,
            lives_left: 0,
            level_on: 1,
            num_ledges: crate::sim::level::NUM_PLATFORMS,
            num_enemies: 0,
            num_enemies_this_level: 0,
            dead_enemies: 0,
            num_owls: 0,
            spawned_enemies: 0,
            count_down_timer: 0,
            next_spawn_frame: 0,
            spawn_retry_frames: 0,
            events: Vec::new(),
        }
    }

    /// Current score. Read-only outside the scorekeeper.
    pub fn score(&self) -> u64 {
        self.the_score
    }

    /// The only score mutator; the score never decreases
    pub(crate) fn add_to_score(&mut self, value: u32) {
        self.the_score += u64::from(value);
    }

    /// A new run starts from zero. Nothing else may lower the score.
    pub(crate) fn reset_score(&mut self) {
        self.the_score = 0;
    }

    /// A free slot index, scanning in fixed order
    pub fn free_slot(&self) -> Option<usize> {
        self.enemies.iter().position(|e| !e.is_live())
    }
}
