//! The lava hand
//!
//! A single grab-zone actor over the pit between the banks. It wakes
//! when the player strays into the zone, rises, and on contact drags
//! the player down while flaps are weakened. Escape is flapping clear
//! of the zone top. Everything here is deterministic; the hand never
//! rolls the dice.

use super::state::{GameState, HAND_HEIGHT, HAND_HOME, HAND_WIDTH, HandMode, PlayerMode};

/// Rise and retreat speed, px per frame
const HAND_SPEED: i32 = 3;
/// Downward drag applied to a clutched player, px per frame
const HAND_PULL: i32 = 2;

pub fn handle_hand(state: &mut GameState) {
    match state.hand.mode {
        HandMode::Idle => {
            if state.player.mode != PlayerMode::Bones
                && state.player.dest.intersects(&state.hand.grab_zone)
            {
                state.hand.mode = HandMode::Reaching;
            }
        }
        HandMode::Reaching => handle_reaching(state),
        HandMode::Clutching => handle_clutching(state),
    }
}

fn handle_reaching(state: &mut GameState) {
    let player_in_zone = state.player.mode != PlayerMode::Bones
        && state.player.dest.intersects(&state.hand.grab_zone);

    if player_in_zone {
        let tx = state.player.dest.center_h() - HAND_WIDTH / 2;
        let ty = state.player.dest.bottom - HAND_HEIGHT / 2;
        step_toward(state, tx, ty);
        if state.hand.dest.intersects(&state.player.dest) {
            state.hand.mode = HandMode::Clutching;
        }
    } else {
        // Sink back under the lava
        step_toward(state, HAND_HOME.left, HAND_HOME.top);
        if state.hand.dest == HAND_HOME {
            state.hand.mode = HandMode::Idle;
        }
    }
}

fn handle_clutching(state: &mut GameState) {
    let escaped = state.player.dest.bottom < state.hand.grab_zone.top;
    if escaped || state.player.mode == PlayerMode::Bones {
        state.hand.mode = HandMode::Reaching;
        return;
    }

    // Drag the player down and stay attached
    let p = &mut state.player;
    p.clutched = true;
    p.v += HAND_PULL;
    p.v_vel = p.v_vel.max(0);
    p.sync_dest();

    let tx = state.player.dest.center_h() - HAND_WIDTH / 2;
    let ty = state.player.dest.bottom - HAND_HEIGHT / 2;
    state.hand.dest.move_to(tx, ty);
}

fn step_toward(state: &mut GameState, tx: i32, ty: i32) {
    let dx = (tx - state.hand.dest.left).clamp(-HAND_SPEED, HAND_SPEED);
    let dy = (ty - state.hand.dest.top).clamp(-HAND_SPEED, HAND_SPEED);
    state.hand.dest.offset(dx, dy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::new_game;

    fn playing_state() -> GameState {
        let mut state = GameState::new(9);
        new_game(&mut state);
        state.events.clear();
        state
    }

    fn drop_player_into_zone(state: &mut GameState) {
        let zone = state.hand.grab_zone;
        let p = &mut state.player;
        p.mode = PlayerMode::Flying;
        p.h = zone.center_h() - crate::consts::PLAYER_WIDTH / 2;
        p.v = zone.top + 4;
        p.v_vel = 0;
        p.sync_dest();
    }

    #[test]
    fn test_hand_wakes_when_player_enters_zone() {
        let mut state = playing_state();
        handle_hand(&mut state);
        assert_eq!(state.hand.mode, HandMode::Idle);

        drop_player_into_zone(&mut state);
        handle_hand(&mut state);
        assert_eq!(state.hand.mode, HandMode::Reaching);
    }

    #[test]
    fn test_hand_reaches_clutches_and_drags() {
        let mut state = playing_state();
        drop_player_into_zone(&mut state);

        for _ in 0..200 {
            handle_hand(&mut state);
            if state.hand.mode == HandMode::Clutching {
                break;
            }
        }
        assert_eq!(state.hand.mode, HandMode::Clutching);

        let v_before = state.player.v;
        handle_hand(&mut state);
        assert!(state.player.clutched);
        assert_eq!(state.player.v, v_before + HAND_PULL);
    }

    #[test]
    fn test_player_escapes_over_the_zone_top() {
        let mut state = playing_state();
        drop_player_into_zone(&mut state);
        for _ in 0..200 {
            handle_hand(&mut state);
            if state.hand.mode == HandMode::Clutching {
                break;
            }
        }

        // Flap clear of the zone
        let zone_top = state.hand.grab_zone.top;
        let p = &mut state.player;
        p.v = zone_top - crate::consts::PLAYER_HEIGHT - 2;
        p.sync_dest();

        handle_hand(&mut state);
        assert_eq!(state.hand.mode, HandMode::Reaching);

        // With the player gone the hand sinks home and goes idle
        for _ in 0..200 {
            handle_hand(&mut state);
            if state.hand.mode == HandMode::Idle {
                break;
            }
        }
        assert_eq!(state.hand.mode, HandMode::Idle);
        assert_eq!(state.hand.dest, HAND_HOME);
    }

    #[test]
    fn test_identical_runs_move_the_hand_identically() {
        let mut a = playing_state();
        let mut b = playing_state();
        drop_player_into_zone(&mut a);
        drop_player_into_zone(&mut b);
        for _ in 0..50 {
            handle_hand(&mut a);
            handle_hand(&mut b);
            assert_eq!(a.hand, b.hand);
        }
    }
}
