//! Enemy state machine and spawner
//!
//! Enemies live in a fixed slot array; spawning claims a free index and
//! death frees it again. Per-mode handlers mirror the player's dispatch
//! but with the altitude-seeking flight AI and the egg reincarnation
//! cycle layered on. All randomness (species roll, pad scan start,
//! altitude jitter, cooldowns) draws from the single seeded stream in
//! slot order, which keeps the whole population deterministic.

use rand::Rng;

use super::geom::Rect;
use super::level::{self, SpawnPad};
use super::state::{Enemy, EnemyKind, EnemyMode, GameState};
use crate::consts::*;

/// Cooldown before a freshly airborne enemy will consider landing again
const LANDING_HOLDOFF_FRAMES: i32 = 45;

/// Padding around a spawn pad that must be clear of other actors
const SPAWN_CLEARANCE: i32 = 24;

pub fn move_enemies(state: &mut GameState) {
    for i in 0..MAX_ENEMIES {
        if !state.enemies[i].is_live() {
            continue;
        }
        state.enemies[i].begin_frame();
        match state.enemies[i].mode {
            EnemyMode::Spawning => handle_spawning_enemy(state, i),
            EnemyMode::Flying => handle_flying_enemies(state, i),
            EnemyMode::Walking => handle_walking_enemy(state, i),
            EnemyMode::Falling => handle_falling_enemy(state, i),
            EnemyMode::Egg => handle_egg_enemy(state, i),
            EnemyMode::Idle => {}
        }
    }
}

fn handle_spawning_enemy(state: &mut GameState, i: usize) {
    let mut e = state.enemies[i];
    e.pass -= 1;
    e.frame += 1;
    e.src_num = (e.frame / 4) % 4;
    if e.pass <= 0 {
        e.mode = EnemyMode::Flying;
        e.v_vel = -e.flap_impulse;
        e.h_vel = if state.player.dest.center_h() >= e.dest.center_h() {
            1
        } else {
            -1
        };
        e.facing_right = e.h_vel > 0;
        e.pass = LANDING_HOLDOFF_FRAMES;
        state.enemies[i] = e;
        let alt = assign_new_altitude(state);
        state.enemies[i].target_alt = alt;
        return;
    }
    e.sync_dest();
    state.enemies[i] = e;
}

fn handle_flying_enemies(state: &mut GameState, i: usize) {
    let cadence = state.tuning.kind(state.enemies[i].kind).flap_cadence as u64;
    let mut e = state.enemies[i];

    e.pass = (e.pass - 1).max(0);

    // Wing beat on the species cadence, only while below the target
    let beat = (state.time_frames + i as u64 * 3).is_multiple_of(cadence);
    if beat && e.v > e.target_alt {
        e.v_vel -= e.flap_impulse;
        e.frame += 1;
    }

    // Enemies fall at half the player's rate
    if state.even_frame {
        e.v_vel += 1;
    }
    e.v_vel = e.v_vel.clamp(-e.max_v_vel, e.max_v_vel);

    // Loose horizontal pursuit
    if (state.time_frames + i as u64).is_multiple_of(8) {
        let dir = (state.player.dest.center_h() - e.dest.center_h()).signum();
        if dir != 0 {
            e.h_vel = (e.h_vel + dir).clamp(-e.max_h_vel, e.max_h_vel);
            e.facing_right = e.h_vel >= 0;
        }
    }

    // Once the holdoff expires, a strip within smelling range below
    // retargets the flight onto it
    if e.pass <= 0 {
        for strip in level::touch_downs(state.num_ledges) {
            let over = e.dest.center_h() >= strip.left && e.dest.center_h() < strip.right;
            let gap = strip.top - e.dest.bottom;
            if over && gap >= 0 && gap <= e.height_smell {
                e.target_alt = strip.top - ENEMY_HEIGHT;
                break;
            }
        }
    }

    e.h += e.h_vel;
    e.v += e.v_vel;
    e.sync_dest();
    e.src_num = 4 + (e.frame % 2);
    state.enemies[i] = e;

    check_enemy_platform_hit(state, i);
    check_enemy_roof_collision(state, i);
    check_enemy_wrap_around(state, i);
}

fn handle_walking_enemy(state: &mut GameState, i: usize) {
    let mut e = state.enemies[i];
    e.pass -= 1;

    if e.pass <= 0 {
        take_off(state, i);
        return;
    }

    e.h += e.h_vel;
    e.frame += 1;
    e.src_num = (e.frame / 3) % 4;
    e.sync_dest();

    // Pace the strip underfoot, reversing at the edges. Matching needs
    // the horizontal extent too; several ledges share one height.
    let strip = level::touch_downs(state.num_ledges).iter().find(|s| {
        e.dest.bottom == s.top
            && e.dest.center_h() >= s.left - 8
            && e.dest.center_h() < s.right + 8
    });
    match strip {
        Some(strip) => {
            if e.dest.center_h() < strip.left {
                e.h_vel = e.h_vel.abs();
                e.facing_right = true;
            } else if e.dest.center_h() >= strip.right {
                e.h_vel = -e.h_vel.abs();
                e.facing_right = false;
            }
            state.enemies[i] = e;
        }
        None => {
            // Nothing underfoot any more; back into the air
            state.enemies[i] = e;
            take_off(state, i);
        }
    }
}

/// Leave a ledge for a fresh altitude
fn take_off(state: &mut GameState, i: usize) {
    let e = &mut state.enemies[i];
    e.mode = EnemyMode::Flying;
    e.v_vel = -e.flap_impulse;
    e.pass = LANDING_HOLDOFF_FRAMES;
    let alt = assign_new_altitude(state);
    state.enemies[i].target_alt = alt;
}

fn handle_falling_enemy(state: &mut GameState, i: usize) {
    let mut e = state.enemies[i];
    e.v_vel = (e.v_vel + 1).min(e.max_v_vel.max(12));
    if (state.time_frames + i as u64).is_multiple_of(4) {
        e.h_vel -= e.h_vel.signum();
    }
    e.h += e.h_vel;
    e.v += e.v_vel;
    e.frame += 1;
    e.src_num = 6;
    e.sync_dest();
    state.enemies[i] = e;

    if state.enemies[i].dest.bottom >= LAVA_LINE {
        eliminate_enemy(state, i);
        return;
    }

    // A strip catches the remains
    let e = &state.enemies[i];
    let landed = level::touch_downs(state.num_ledges).iter().position(|s| {
        e.was_dest.bottom <= s.top
            && e.dest.bottom >= s.top
            && e.dest.center_h() >= s.left
            && e.dest.center_h() < s.right
    });
    if let Some(ledge) = landed {
        resolve_fallen(state, i, ledge);
        return;
    }

    check_enemy_wrap_around(state, i);
}

/// A downed enemy on a ledge becomes an egg if its species lays one
fn resolve_fallen(state: &mut GameState, i: usize, ledge: usize) {
    let strip = level::touch_downs(state.num_ledges)[ledge];
    if !state.tuning.kind(state.enemies[i].kind).lays_egg {
        eliminate_enemy(state, i);
        return;
    }

    let hatch = state.tuning.director.egg_hatch_frames
        + state
            .rng
            .random_range(0..state.tuning.director.egg_hatch_jitter.max(1));
    let e = &mut state.enemies[i];
    let center = e.dest.center_h();
    e.mode = EnemyMode::Egg;
    e.h = center - EGG_WIDTH / 2;
    e.v = strip.top - EGG_HEIGHT;
    e.h_vel = 0;
    e.v_vel = 0;
    e.pass = hatch;
    e.frame = 0;
    e.src_num = 0;
    e.sync_dest();
}

fn handle_egg_enemy(state: &mut GameState, i: usize) {
    let mut e = state.enemies[i];
    e.pass -= 1;
    state.enemies[i] = e;

    if e.pass <= 0 {
        // Hatch back into the fight, same species, same spot
        let rect = Rect::sized(
            e.dest.center_h() - ENEMY_WIDTH / 2,
            e.dest.bottom - ENEMY_HEIGHT,
            ENEMY_WIDTH,
            ENEMY_HEIGHT,
        );
        init_enemy(state, i, e.kind, rect, e.counted, true);
        log::debug!("egg in slot {i} hatched");
    }
}

/// Strip landing for flyers, solid-body bounces for everything else
fn check_enemy_platform_hit(state: &mut GameState, i: usize) {
    // Landing test first: a descending flyer that crosses a strip top
    // settles onto it
    if state.enemies[i].mode == EnemyMode::Flying && state.enemies[i].v_vel >= 0 {
        let landed = {
            let e = &state.enemies[i];
            level::touch_downs(state.num_ledges).iter().position(|s| {
                e.was_dest.bottom <= s.top
                    && e.dest.bottom >= s.top
                    && e.dest.center_h() >= s.left
                    && e.dest.center_h() < s.right
            })
        };
        if let Some(ledge) = landed {
            let strip = level::touch_downs(state.num_ledges)[ledge];
            let walk = state.tuning.director.walk_frames
                + state
                    .rng
                    .random_range(0..state.tuning.director.walk_jitter.max(1));
            let e = &mut state.enemies[i];
            e.v = strip.top - ENEMY_HEIGHT;
            e.v_vel = 0;
            e.mode = EnemyMode::Walking;
            e.h_vel = if e.facing_right {
                (e.max_h_vel / 2).max(2)
            } else {
                -(e.max_h_vel / 2).max(2)
            };
            e.pass = walk;
            e.sync_dest();
            return;
        }
    }

    for ledge in 0..state.num_ledges {
        let slab = level::platforms(state.num_ledges)[ledge];
        let e = &mut state.enemies[i];
        if !e.dest.intersects(&slab) {
            continue;
        }

        if e.was_dest.bottom <= slab.top && e.v_vel >= 0 {
            // Skittering off the slab outside its strip
            e.v = slab.top - ENEMY_HEIGHT;
            e.v_vel = -2;
        } else if e.was_dest.top >= slab.bottom && e.v_vel <= 0 {
            e.v = slab.bottom;
            e.v_vel = (-e.v_vel / 2).max(1);
        } else {
            if e.was_dest.center_h() < slab.center_h() {
                e.h = slab.left - ENEMY_WIDTH;
            } else {
                e.h = slab.right;
            }
            e.h_vel = -e.h_vel;
            e.facing_right = e.h_vel >= 0;
        }
        e.sync_dest();
    }
}

/// The roof is a bounce for enemies, not a kill
fn check_enemy_roof_collision(state: &mut GameState, i: usize) {
    let e = &mut state.enemies[i];
    if e.dest.top <= ROOF_LINE {
        e.v = ROOF_LINE + 1;
        e.v_vel = (-e.v_vel / 2).max(1);
        e.sync_dest();
    }
}

/// Same modulo-width teleport as the player
fn check_enemy_wrap_around(state: &mut GameState, i: usize) {
    let e = &mut state.enemies[i];
    let cx = e.dest.center_h();
    if cx < 0 {
        e.h += ARENA_WIDTH;
        e.sync_dest();
    } else if cx >= ARENA_WIDTH {
        e.h -= ARENA_WIDTH;
        e.sync_dest();
    }
}

/// Per-frame spawn gate: introduces the level's enemies over time while
/// slots and pads allow
pub fn generate_enemies(state: &mut GameState) {
    if state.spawned_enemies >= state.num_enemies_this_level {
        return;
    }
    if state.time_frames < state.next_spawn_frame {
        return;
    }
    let Some(slot) = state.free_slot() else {
        defer_spawn(state);
        return;
    };

    match set_enemy_initial_location(state) {
        Some(rect) => {
            let kind = roll_kind(state);
            init_enemy(state, slot, kind, rect, true, false);
            state.spawned_enemies += 1;
            state.next_spawn_frame =
                state.time_frames + u64::from(state.tuning.director.spawn_interval);
            state.spawn_retry_frames = 0;
            log::debug!(
                "spawned {:?} in slot {slot} ({}/{})",
                kind,
                state.spawned_enemies,
                state.num_enemies_this_level
            );
        }
        None => defer_spawn(state),
    }
}

fn defer_spawn(state: &mut GameState) {
    state.next_spawn_frame = state.time_frames + 1;
    state.spawn_retry_frames += 1;
    if state.spawn_retry_frames == state.tuning.director.spawn_starve_frames {
        log::warn!(
            "spawn starved for {} frames on level {}; check the pad layout",
            state.spawn_retry_frames,
            state.level_on
        );
    }
}

/// An enemy-sized rect standing on a clear spawn pad, or None when
/// every pad is blocked this frame
pub fn set_enemy_initial_location(state: &mut GameState) -> Option<Rect> {
    let pads = level::spawn_pads(state.num_ledges);
    let start = state.rng.random_range(0..pads.len());

    for k in 0..pads.len() {
        let pad: &SpawnPad = &pads[(start + k) % pads.len()];
        let clearance = pad.rect.inset_by(-SPAWN_CLEARANCE, -SPAWN_CLEARANCE);
        if clearance.intersects(&state.player.dest) {
            continue;
        }
        if state
            .enemies
            .iter()
            .any(|e| e.is_live() && clearance.intersects(&e.dest))
        {
            continue;
        }
        return Some(Rect::sized(
            pad.rect.center_h() - ENEMY_WIDTH / 2,
            pad.rect.bottom - 1 - ENEMY_HEIGHT,
            ENEMY_WIDTH,
            ENEMY_HEIGHT,
        ));
    }
    None
}

/// Species roll for a scheduled spawn; jackals crowd in as levels climb
fn roll_kind(state: &mut GameState) -> EnemyKind {
    let pct = state.tuning.jackal_pct_for_level(state.level_on);
    if state.rng.random_range(0..100u32) < pct {
        EnemyKind::Jackal
    } else {
        EnemyKind::Wolf
    }
}

/// Claim a slot for a new or reincarnated enemy
pub fn init_enemy(
    state: &mut GameState,
    slot: usize,
    kind: EnemyKind,
    rect: Rect,
    counted: bool,
    reincarnated: bool,
) {
    let facing = state.player.dest.center_h() >= rect.center_h();
    let e = &mut state.enemies[slot];
    *e = Enemy::empty();
    e.kind = kind;
    e.mode = EnemyMode::Spawning;
    e.pass = SPAWN_ANIM_FRAMES;
    e.counted = counted;
    e.h = rect.left;
    e.v = rect.top;
    e.facing_right = facing;
    e.target_alt = rect.top;
    e.sync_dest();
    e.was_dest = e.dest;
    e.was_h = e.h;
    e.was_v = e.v;

    set_enemy_attributes(state, slot);

    if !reincarnated {
        state.num_enemies += 1;
        if kind == EnemyKind::Owl {
            state.num_owls += 1;
        }
    }
}

/// Copy the species row onto the slot. Attributes never change after
/// this.
fn set_enemy_attributes(state: &mut GameState, slot: usize) {
    let attrs = *state.tuning.kind(state.enemies[slot].kind);
    let e = &mut state.enemies[slot];
    e.max_h_vel = attrs.max_h_vel;
    e.max_v_vel = attrs.max_v_vel;
    e.flap_impulse = attrs.flap_impulse;
    e.height_smell = attrs.height_smell;
}

/// Pick the altitude band farthest from both the player and the bands
/// other flyers have already claimed, with a little seeded jitter
pub fn assign_new_altitude(state: &mut GameState) -> i32 {
    let mut best = level::ALTITUDE_BANDS[0];
    let mut best_score = i32::MIN;

    for &band in &level::ALTITUDE_BANDS {
        let d_player = (band - state.player.v).abs();
        let d_claimed = state
            .enemies
            .iter()
            .filter(|e| e.mode == EnemyMode::Flying)
            .map(|e| (band - e.target_alt).abs())
            .min()
            .unwrap_or(i32::MAX);
        let score = d_player.min(d_claimed);
        if score > best_score {
            best_score = score;
            best = band;
        }
    }

    best + state.rng.random_range(-16..=16)
}

/// Lethal hit from the player: into the tumble. Scoring is the
/// caller's business.
pub fn kill_enemy(state: &mut GameState, i: usize) {
    let push = state.player.h_vel / 2;
    let e = &mut state.enemies[i];
    e.mode = EnemyMode::Falling;
    e.v_vel = -4;
    e.h_vel = push;
    e.frame = 0;
    e.sync_dest();
}

/// Free the slot and settle the level accounting
pub fn eliminate_enemy(state: &mut GameState, i: usize) {
    let was = state.enemies[i];
    state.enemies[i] = Enemy::empty();
    state.num_enemies = state.num_enemies.saturating_sub(1);
    if was.kind == EnemyKind::Owl {
        state.num_owls = state.num_owls.saturating_sub(1);
    }
    if was.counted {
        state.dead_enemies += 1;
    }
    log::debug!(
        "slot {i} cleared ({:?}); {}/{} down",
        was.kind,
        state.dead_enemies,
        state.num_enemies_this_level
    );
}

/// Countdown penalty: loose an owl if the roost has room
pub fn release_owl(state: &mut GameState) {
    if state.num_owls >= state.tuning.director.max_owls {
        return;
    }
    let Some(slot) = state.free_slot() else {
        return;
    };
    if let Some(rect) = set_enemy_initial_location(state) {
        init_enemy(state, slot, EnemyKind::Owl, rect, false, false);
        log::info!("countdown expired; an owl is loosed");
    }
}
