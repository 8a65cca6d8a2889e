//! Player-enemy collision resolution
//!
//! The combat rule of the whole game: a pounce from above kills the
//! enemy, side or below contact kills the player unless flight turns it
//! into a clutch. Slots are tested in fixed order and at most one
//! lethal outcome resolves per frame.

use super::enemy;
use super::player;
use super::state::{EnemyMode, GameState, PlayerMode};
use crate::consts::MAX_ENEMIES;

/// Outcome of one overlapping player/enemy pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    EnemyDown,
    PlayerDown,
    /// Non-lethal grab; both actors bounce apart
    Clutch,
}

/// Directional resolution for a pair already known to overlap
pub fn resolve_enemy_player_hit(state: &GameState, i: usize) -> HitOutcome {
    let p = &state.player;
    let e = &state.enemies[i];

    // Descending onto the enemy from above is a kill
    if p.v_vel > 0 && p.was_dest.top < e.was_dest.top {
        HitOutcome::EnemyDown
    } else if p.mode == PlayerMode::Flying {
        HitOutcome::Clutch
    } else {
        HitOutcome::PlayerDown
    }
}

pub fn check_player_enemy_collision(state: &mut GameState) {
    if state.player.mode == PlayerMode::Bones || state.player.wrapping {
        return;
    }

    for i in 0..MAX_ENEMIES {
        if !state.player.dest.intersects(&state.enemies[i].dest) {
            continue;
        }
        match state.enemies[i].mode {
            EnemyMode::Egg => collect_egg(state, i),
            EnemyMode::Flying | EnemyMode::Walking => {
                match resolve_enemy_player_hit(state, i) {
                    HitOutcome::EnemyDown => {
                        let points = state.tuning.kind(state.enemies[i].kind).kill_points;
                        enemy::kill_enemy(state, i);
                        state.add_to_score(points);
                        // Downed this frame; no further tests touch it
                    }
                    HitOutcome::PlayerDown => {
                        state.player.v_vel = -6;
                        player::kill_player(state);
                        // Only the first lethal hit resolves per frame
                        return;
                    }
                    HitOutcome::Clutch => apply_clutch(state, i),
                }
            }
            _ => {}
        }
    }
}

/// Shove the grappled pair apart; nobody dies
fn apply_clutch(state: &mut GameState, i: usize) {
    let dir = (state.player.dest.center_h() - state.enemies[i].dest.center_h()).signum();
    let dir = if dir == 0 { 1 } else { dir };

    let p = &mut state.player;
    p.clutched = true;
    p.h_vel = dir * p.h_vel.abs().max(4);

    let e = &mut state.enemies[i];
    e.h_vel = -dir * e.h_vel.abs().max(2);
    e.facing_right = e.h_vel >= 0;
}

/// Touching an egg collects it for points and ends that slot for good
fn collect_egg(state: &mut GameState, i: usize) {
    let points = state.tuning.director.egg_points;
    state.add_to_score(points);
    enemy::eliminate_enemy(state, i);
}
