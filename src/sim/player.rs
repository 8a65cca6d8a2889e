//! Player state machine
//!
//! One handler per mode, dispatched on the mode enum. Every frame ends
//! in `set_and_check_player_dest`, which commits the proposed rect only
//! after the ordered platform, touchdown, lava/roof, and wrap checks
//! have each had a chance to veto or clamp it.

use super::level;
use super::state::{GameState, HandMode, PlayerMode};
use super::tick::{self, FrameInput};
use crate::consts::*;

pub fn move_player(state: &mut GameState, input: &FrameInput) {
    state.player.begin_frame();
    state.player.clutched = false;

    match state.player.mode {
        PlayerMode::Idle => handle_player_idle(state, input),
        PlayerMode::Walking => handle_player_walking(state, input),
        PlayerMode::Flying => handle_player_flying(state, input),
        PlayerMode::Sinking => handle_player_sinking(state, input),
        PlayerMode::Falling => handle_player_falling(state, input),
        PlayerMode::Bones => handle_player_bones(state),
    }

    set_and_check_player_dest(state);
}

/// Flap strength, weakened while the hand holds the player
fn flap_impulse(state: &GameState) -> i32 {
    let base = state.tuning.player.flap_impulse;
    if state.hand.mode == HandMode::Clutching {
        base / 2
    } else {
        base
    }
}

/// The strip index directly under the player's feet, if any
fn ledge_underfoot(state: &GameState) -> Option<usize> {
    let p = &state.player;
    level::touch_downs(state.num_ledges)
        .iter()
        .position(|strip| {
            p.dest.bottom == strip.top
                && p.dest.center_h() >= strip.left
                && p.dest.center_h() < strip.right
        })
}

fn start_flight(state: &mut GameState) {
    let impulse = flap_impulse(state);
    let p = &mut state.player;
    p.v_vel = (p.v_vel - impulse).max(-state.tuning.player.max_v_vel);
    p.mode = PlayerMode::Flying;
    p.flapping = true;
    p.walking = false;
}

fn handle_player_idle(state: &mut GameState, input: &FrameInput) {
    if input.flap_pressed {
        start_flight(state);
        return;
    }

    let p = &mut state.player;
    p.flapping = false;
    p.walking = false;
    p.h_vel -= p.h_vel.signum();

    if input.left != input.right {
        p.mode = PlayerMode::Walking;
        p.walking = true;
        p.facing_right = input.right;
    }

    if ledge_underfoot(state).is_none() {
        state.player.mode = PlayerMode::Falling;
    }
}

fn handle_player_walking(state: &mut GameState, input: &FrameInput) {
    if input.flap_pressed {
        start_flight(state);
        return;
    }

    let tun = state.tuning.player;
    let p = &mut state.player;
    p.flapping = false;

    if input.left != input.right {
        p.facing_right = input.right;
        let accel = if input.right {
            tun.walk_accel
        } else {
            -tun.walk_accel
        };
        p.h_vel = (p.h_vel + accel).clamp(-tun.walk_speed, tun.walk_speed);
        p.frame += 1;
        p.src_num = (p.frame / 2) % 4;
    } else {
        p.h_vel -= p.h_vel.signum();
        if p.h_vel == 0 {
            p.mode = PlayerMode::Idle;
            p.walking = false;
        }
    }

    if ledge_underfoot(state).is_none() {
        let p = &mut state.player;
        p.mode = PlayerMode::Falling;
        p.walking = false;
    }
}

fn handle_player_flying(state: &mut GameState, input: &FrameInput) {
    if input.flap_pressed {
        let impulse = flap_impulse(state);
        let p = &mut state.player;
        p.v_vel -= impulse;
        p.flapping = true;
    } else {
        state.player.flapping = false;
    }

    let tun = state.tuning.player;
    let p = &mut state.player;

    if input.left != input.right {
        p.facing_right = input.right;
        let accel = if input.right {
            tun.air_accel
        } else {
            -tun.air_accel
        };
        p.h_vel = (p.h_vel + accel).clamp(-tun.max_h_vel, tun.max_h_vel);
    }

    p.v_vel = (p.v_vel + tun.gravity).clamp(-tun.max_v_vel, tun.max_v_vel);
    p.frame += 1;
    p.src_num = 4 + (p.frame / 2) % 2;

    if p.v_vel > tun.sink_threshold && !input.flap_held {
        p.mode = PlayerMode::Sinking;
        p.flapping = false;
    }
}

fn handle_player_sinking(state: &mut GameState, input: &FrameInput) {
    if input.flap_pressed {
        let impulse = flap_impulse(state);
        let p = &mut state.player;
        p.v_vel -= impulse;
        p.mode = PlayerMode::Flying;
        p.flapping = true;
        return;
    }

    let tun = state.tuning.player;
    let p = &mut state.player;
    p.v_vel = (p.v_vel + tun.gravity).min(tun.max_v_vel);

    if p.v_vel >= tun.max_v_vel && !input.flap_held {
        p.mode = PlayerMode::Falling;
    }
}

fn handle_player_falling(state: &mut GameState, input: &FrameInput) {
    if input.flap_pressed {
        let impulse = flap_impulse(state);
        let p = &mut state.player;
        p.v_vel -= impulse;
        p.mode = PlayerMode::Flying;
        p.flapping = true;
        return;
    }

    let tun = state.tuning.player;
    let p = &mut state.player;
    p.v_vel = (p.v_vel + tun.gravity).min(tun.max_v_vel);
}

fn handle_player_bones(state: &mut GameState) {
    let tun = state.tuning.player;
    let p = &mut state.player;
    p.h_vel -= p.h_vel.signum();
    p.v_vel = (p.v_vel + tun.gravity).min(tun.max_v_vel);
    p.frame += 1;
    p.src_num = 8 + (p.frame / 4) % 3;
}

/// Commit the frame's proposed rect through the ordered checks. A wrap
/// on the previous frame suppresses every check for this one.
pub fn set_and_check_player_dest(state: &mut GameState) {
    let p = &mut state.player;
    p.h += p.h_vel;
    p.v += p.v_vel;
    p.sync_dest();

    if p.wrapping {
        p.wrapping = false;
        update_wrap_rect(state);
        return;
    }

    if state.player.mode == PlayerMode::Bones {
        // The remains fall through platforms and lava but still wrap;
        // life loss runs once they clear the arena.
        check_player_wrap_around(state);
        if state.player.dest.top > ARENA_HEIGHT {
            off_a_mortal(state);
        }
        return;
    }

    check_platform_collision(state);
    check_touch_down_collision(state);
    check_lava_roof_collision(state);
    check_player_wrap_around(state);
}

/// Clamp the player to rest on a ledge's strip top
pub fn keep_player_on_platform(state: &mut GameState, ledge: usize) {
    let strip = &level::touch_downs(state.num_ledges)[ledge];
    let p = &mut state.player;
    p.v = strip.top - PLAYER_HEIGHT;
    p.v_vel = 0;
    p.mode = PlayerMode::Walking;
    p.walking = true;
    p.flapping = false;
    p.sync_dest();
}

/// Solid-body test against the platform slabs: land on top, bump the
/// head from below, bounce off the sides
fn check_platform_collision(state: &mut GameState) {
    for ledge in 0..state.num_ledges {
        let slab = level::platforms(state.num_ledges)[ledge];
        let p = &state.player;
        if !p.dest.intersects(&slab) {
            continue;
        }

        if p.was_dest.bottom <= slab.top && p.v_vel >= 0 {
            keep_player_on_platform(state, ledge);
        } else if p.was_dest.top >= slab.bottom && p.v_vel <= 0 {
            let p = &mut state.player;
            p.v = slab.bottom;
            p.v_vel = (-p.v_vel / 2).max(1);
            p.sync_dest();
        } else {
            let p = &mut state.player;
            if p.was_dest.center_h() < slab.center_h() {
                p.h = slab.left - PLAYER_WIDTH;
            } else {
                p.h = slab.right;
            }
            p.h_vel = -p.h_vel;
            p.sync_dest();
        }
    }
}

/// Precise airborne landing on a walkable strip
fn check_touch_down_collision(state: &mut GameState) {
    if !state.player.airborne() || state.player.v_vel < 0 {
        return;
    }

    for ledge in 0..state.num_ledges {
        let strip = level::touch_downs(state.num_ledges)[ledge];
        let p = &state.player;
        let crossed = p.was_dest.bottom <= strip.top && p.dest.bottom >= strip.top;
        let over = p.dest.center_h() >= strip.left && p.dest.center_h() < strip.right;
        if crossed && over {
            keep_player_on_platform(state, ledge);
            return;
        }
    }
}

/// The roof and the lava are both fatal to the player
fn check_lava_roof_collision(state: &mut GameState) {
    if state.player.mode == PlayerMode::Bones {
        return;
    }

    if state.player.dest.top <= ROOF_LINE {
        state.player.v = ROOF_LINE + 1;
        state.player.v_vel = 2;
        kill_player(state);
        return;
    }

    if state.player.dest.bottom >= LAVA_LINE {
        state.player.v_vel = -6;
        kill_player(state);
    }
}

/// Put the player into the death tumble
pub fn kill_player(state: &mut GameState) {
    let p = &mut state.player;
    p.mode = PlayerMode::Bones;
    p.flapping = false;
    p.walking = false;
    p.frame = 0;
    p.sync_dest();
    log::info!("player down at ({}, {})", p.h, p.v);
}

/// Teleport across the arena edge once the rect center crosses it, and
/// keep the opposite-edge copy current for the straddling frames
fn check_player_wrap_around(state: &mut GameState) {
    let p = &mut state.player;
    let cx = p.dest.center_h();
    if cx < 0 {
        p.h += ARENA_WIDTH;
        p.wrapping = true;
        p.sync_dest();
    } else if cx >= ARENA_WIDTH {
        p.h -= ARENA_WIDTH;
        p.wrapping = true;
        p.sync_dest();
    }
    update_wrap_rect(state);
}

fn update_wrap_rect(state: &mut GameState) {
    let p = &mut state.player;
    if p.dest.left < 0 {
        p.wrap = p.dest.offset_by(ARENA_WIDTH, 0);
    } else if p.dest.right > ARENA_WIDTH {
        p.wrap = p.dest.offset_by(-ARENA_WIDTH, 0);
    } else {
        p.wrap = p.dest;
    }
}

/// One life down. Zero lives ends the game; otherwise the player
/// returns to idle at the fixed start position.
pub fn off_a_mortal(state: &mut GameState) {
    state.lives_left = state.lives_left.saturating_sub(1);
    if state.lives_left == 0 {
        tick::end_game(state);
    } else {
        log::info!("{} lives left", state.lives_left);
        reset_player(state);
    }
}

/// Fresh player at the start pad; also releases the hand
pub fn reset_player(state: &mut GameState) {
    state.player = super::state::Player::at_start();
    state.hand = super::state::Hand::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, PlayerMode};
    use crate::sim::tick::new_game;

    fn playing_state() -> GameState {
        let mut state = GameState::new(11);
        new_game(&mut state);
        state.events.clear();
        state
    }

    fn no_input() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn test_platform_landing_scenario() {
        let mut state = playing_state();
        let strip = level::TOUCH_DOWN_RECTS[2];

        // Falling at +12 with the strip top 4 below the player's feet
        let p = &mut state.player;
        p.mode = PlayerMode::Falling;
        p.h = strip.center_h() - PLAYER_WIDTH / 2;
        p.v = strip.top - 4 - PLAYER_HEIGHT;
        p.v_vel = 12;
        p.h_vel = 0;
        p.sync_dest();

        move_player(&mut state, &no_input());

        let p = &state.player;
        assert_eq!(p.dest.bottom, strip.top);
        assert_eq!(p.v_vel, 0);
        assert_eq!(p.mode, PlayerMode::Walking);
    }

    #[test]
    fn test_walking_off_the_strip_edge_falls() {
        let mut state = playing_state();
        let strip = level::TOUCH_DOWN_RECTS[5];

        let p = &mut state.player;
        p.mode = PlayerMode::Walking;
        p.walking = true;
        p.h = strip.right - PLAYER_WIDTH / 2 - 1;
        p.v = strip.top - PLAYER_HEIGHT;
        p.h_vel = state.tuning.player.walk_speed;
        p.sync_dest();

        let input = FrameInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..4 {
            move_player(&mut state, &input);
            if state.player.mode == PlayerMode::Falling {
                return;
            }
        }
        panic!("never left the ledge");
    }

    #[test]
    fn test_flap_from_idle_lifts_off() {
        let mut state = playing_state();
        let input = FrameInput {
            flap_held: true,
            flap_pressed: true,
            ..Default::default()
        };
        move_player(&mut state, &input);
        assert_eq!(state.player.mode, PlayerMode::Flying);
        assert!(state.player.v_vel < 0);
        assert!(state.player.flapping);
    }

    #[test]
    fn test_unrenewed_flight_sinks_then_falls() {
        let mut state = playing_state();
        let p = &mut state.player;
        p.mode = PlayerMode::Flying;
        p.h = 300;
        p.v = 60;
        p.v_vel = state.tuning.player.sink_threshold;
        p.sync_dest();

        move_player(&mut state, &no_input());
        assert_eq!(state.player.mode, PlayerMode::Sinking);

        for _ in 0..20 {
            if state.player.mode != PlayerMode::Sinking {
                break;
            }
            move_player(&mut state, &no_input());
        }
        assert_eq!(state.player.mode, PlayerMode::Falling);
    }

    #[test]
    fn test_roof_contact_is_fatal() {
        let mut state = playing_state();
        let p = &mut state.player;
        p.mode = PlayerMode::Flying;
        p.h = 300;
        p.v = ROOF_LINE + 3;
        p.v_vel = -10;
        p.sync_dest();

        let input = FrameInput {
            flap_held: true,
            ..Default::default()
        };
        move_player(&mut state, &input);
        assert_eq!(state.player.mode, PlayerMode::Bones);
    }

    #[test]
    fn test_lava_contact_is_fatal() {
        let mut state = playing_state();
        let p = &mut state.player;
        p.mode = PlayerMode::Falling;
        p.h = 300;
        p.v = LAVA_LINE - PLAYER_HEIGHT - 2;
        p.v_vel = 12;
        p.sync_dest();

        move_player(&mut state, &no_input());
        assert_eq!(state.player.mode, PlayerMode::Bones);
    }

    #[test]
    fn test_wrap_teleports_and_suppresses_one_frame() {
        let mut state = playing_state();
        let p = &mut state.player;
        p.mode = PlayerMode::Flying;
        p.h = -PLAYER_WIDTH / 2 - 2;
        p.v = 100;
        p.h_vel = -4;
        p.v_vel = 0;
        p.sync_dest();

        let input = FrameInput {
            flap_held: true,
            ..Default::default()
        };
        move_player(&mut state, &input);

        let p = &state.player;
        assert!(p.wrapping);
        assert!(p.dest.center_h() >= 0 && p.dest.center_h() < ARENA_WIDTH);

        // The suppressed frame clears the flag without running checks
        move_player(&mut state, &input);
        assert!(!state.player.wrapping);
    }

    #[test]
    fn test_off_a_mortal_respawns_with_lives_remaining() {
        let mut state = playing_state();
        assert_eq!(state.lives_left, 3);
        kill_player(&mut state);
        off_a_mortal(&mut state);
        assert_eq!(state.lives_left, 2);
        assert_eq!(state.player.mode, PlayerMode::Idle);
        assert_eq!(state.player.h, PLAYER_START_H);
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
