//! Data-driven game balance
//!
//! Every gameplay constant that is a judgment call rather than geometry
//! lives here, so a whole balance pass is a JSON file instead of a code
//! change. The defaults are the shipped game.

use serde::{Deserialize, Serialize};

use crate::sim::state::EnemyKind;

/// Player physics, in pixels and pixels-per-frame at the fixed rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTuning {
    /// Downward acceleration per airborne frame
    pub gravity: i32,
    /// Upward velocity added by one flap press
    pub flap_impulse: i32,
    /// Horizontal speed cap while airborne
    pub max_h_vel: i32,
    /// Terminal fall speed
    pub max_v_vel: i32,
    /// Horizontal speed cap while walking
    pub walk_speed: i32,
    /// Per-frame acceleration from held directional input
    pub walk_accel: i32,
    pub air_accel: i32,
    /// Descent speed beyond which an un-renewed flight becomes a sink
    pub sink_threshold: i32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            gravity: 1,
            flap_impulse: 12,
            max_h_vel: 8,
            max_v_vel: 16,
            walk_speed: 6,
            walk_accel: 2,
            air_accel: 1,
            sink_threshold: 8,
        }
    }
}

/// Per-species enemy attributes, applied once at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTuning {
    pub max_h_vel: i32,
    pub max_v_vel: i32,
    /// Upward velocity added by one wing beat
    pub flap_impulse: i32,
    /// Frames between wing beats while climbing
    pub flap_cadence: u32,
    /// Vertical range within which a walkable strip below is sensed
    pub height_smell: i32,
    /// Whether a lethal hit leaves an egg instead of a corpse
    pub lays_egg: bool,
    /// Score for dispatching this species
    pub kill_points: u32,
}

impl Default for KindTuning {
    fn default() -> Self {
        // Wolf is the baseline species
        Self {
            max_h_vel: 4,
            max_v_vel: 8,
            flap_impulse: 6,
            flap_cadence: 10,
            height_smell: 96,
            lays_egg: true,
            kill_points: 500,
        }
    }
}

/// Director pacing: spawn cadence, level scaling, timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorTuning {
    /// Enemies on level 1
    pub base_enemies: u32,
    /// Additional enemies per level
    pub enemies_per_level: u32,
    /// Hard cap on a level's enemy count
    pub max_enemies_per_level: u32,
    /// Frames between scheduled spawns
    pub spawn_interval: u32,
    /// Consecutive deferred-spawn frames before the starvation diagnostic
    pub spawn_starve_frames: u32,
    /// Level countdown on level 1, in frames
    pub level_timer: i32,
    /// Countdown reduction per level
    pub level_timer_step: i32,
    /// Countdown floor
    pub min_level_timer: i32,
    /// Countdown restart value after an owl penalty release
    pub owl_timer: i32,
    /// Most owls alive at once
    pub max_owls: u32,
    /// Egg hatch delay: fixed part plus seeded jitter range
    pub egg_hatch_frames: i32,
    pub egg_hatch_jitter: i32,
    /// Walking cooldown before takeoff: fixed part plus jitter range
    pub walk_frames: i32,
    pub walk_jitter: i32,
    /// Score for collecting an egg
    pub egg_points: u32,
    /// Jackal share of the species roll: base percent plus growth,
    /// capped
    pub jackal_base_pct: u32,
    pub jackal_pct_per_level: u32,
    pub jackal_max_pct: u32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            base_enemies: 4,
            enemies_per_level: 2,
            max_enemies_per_level: 16,
            spawn_interval: 48,
            spawn_starve_frames: 300,
            level_timer: 1350,
            level_timer_step: 45,
            min_level_timer: 450,
            owl_timer: 450,
            max_owls: 2,
            egg_hatch_frames: 240,
            egg_hatch_jitter: 120,
            walk_frames: 60,
            walk_jitter: 120,
            egg_points: 250,
            jackal_base_pct: 20,
            jackal_pct_per_level: 8,
            jackal_max_pct: 75,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub wolf: KindTuning,
    pub jackal: KindTuning,
    pub owl: KindTuning,
    pub director: DirectorTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl Tuning {
    /// Attribute row for a species
    pub fn kind(&self, kind: EnemyKind) -> &KindTuning {
        match kind {
            EnemyKind::Wolf => &self.wolf,
            EnemyKind::Jackal => &self.jackal,
            EnemyKind::Owl => &self.owl,
        }
    }

    /// Enemies scheduled for a level
    pub fn enemies_for_level(&self, level_on: u32) -> u32 {
        let d = &self.director;
        (d.base_enemies + d.enemies_per_level * level_on.saturating_sub(1))
            .min(d.max_enemies_per_level)
    }

    /// Countdown timer for a level, in frames
    pub fn timer_for_level(&self, level_on: u32) -> i32 {
        let d = &self.director;
        (d.level_timer - d.level_timer_step * level_on.saturating_sub(1) as i32)
            .max(d.min_level_timer)
    }

    /// Jackal percentage of the species roll for a level
    pub fn jackal_pct_for_level(&self, level_on: u32) -> u32 {
        let d = &self.director;
        (d.jackal_base_pct + d.jackal_pct_per_level * level_on.saturating_sub(1))
            .min(d.jackal_max_pct)
    }

    /// Parse a tuning override file
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The shipped balance, with the faster species filled in
    pub fn standard() -> Self {
        Self {
            player: PlayerTuning::default(),
            wolf: KindTuning::default(),
            jackal: KindTuning {
                max_h_vel: 6,
                max_v_vel: 10,
                flap_impulse: 7,
                flap_cadence: 8,
                height_smell: 128,
                lays_egg: true,
                kill_points: 750,
            },
            owl: KindTuning {
                max_h_vel: 8,
                max_v_vel: 12,
                flap_impulse: 8,
                flap_cadence: 6,
                height_smell: 160,
                lays_egg: false,
                kill_points: 1000,
            },
            director: DirectorTuning::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_scaling_caps() {
        let t = Tuning::standard();
        assert_eq!(t.enemies_for_level(1), 4);
        assert_eq!(t.enemies_for_level(2), 6);
        assert_eq!(t.enemies_for_level(50), t.director.max_enemies_per_level);
        assert_eq!(t.timer_for_level(1), t.director.level_timer);
        assert_eq!(t.timer_for_level(100), t.director.min_level_timer);
        assert_eq!(t.jackal_pct_for_level(100), t.director.jackal_max_pct);
    }

    #[test]
    fn test_only_owls_skip_the_egg() {
        let t = Tuning::standard();
        assert!(t.kind(EnemyKind::Wolf).lays_egg);
        assert!(t.kind(EnemyKind::Jackal).lays_egg);
        assert!(!t.kind(EnemyKind::Owl).lays_egg);
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning::standard();
        let json = serde_json::to_string(&t).unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn test_partial_override_rejected_cleanly() {
        // A malformed file is a parse error, not a panic
        assert!(Tuning::from_json("{\"player\": 3}").is_err());
    }
}
