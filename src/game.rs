//! Host facade
//!
//! The surface a windowing/audio host touches. Key events accumulate
//! into a held-key bitmask; `update` snapshots it once per frame so
//! every actor in the simulation observes identical input. Lifecycle
//! events come back through an optional callback, fired only after a
//! frame has fully returned.

use crate::sim::geom::Pt;
use crate::sim::state::GameState;
use crate::sim::tick::{self, FrameInput};
use crate::tuning::Tuning;

pub use crate::sim::state::GameEvent;

/// Keys the simulation understands, with stable bitmask values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GameKey {
    Spacebar = 1,
    DownArrow = 2,
    LeftArrow = 4,
    RightArrow = 8,
    KeyA = 16,
    KeyS = 32,
    Colon = 64,
    Quote = 128,
}

impl GameKey {
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Map a raw host key code; anything unknown is None
    pub fn from_code(code: u8) -> Option<GameKey> {
        match code {
            1 => Some(GameKey::Spacebar),
            2 => Some(GameKey::DownArrow),
            4 => Some(GameKey::LeftArrow),
            8 => Some(GameKey::RightArrow),
            16 => Some(GameKey::KeyA),
            32 => Some(GameKey::KeyS),
            64 => Some(GameKey::Colon),
            128 => Some(GameKey::Quote),
            _ => None,
        }
    }
}

const FLAP_KEYS: u8 = GameKey::Spacebar.bit() | GameKey::DownArrow.bit();
const LEFT_KEYS: u8 = GameKey::LeftArrow.bit() | GameKey::KeyA.bit() | GameKey::Colon.bit();
const RIGHT_KEYS: u8 = GameKey::RightArrow.bit() | GameKey::KeyS.bit() | GameKey::Quote.bit();

type EventCallback = Box<dyn FnMut(GameEvent)>;

/// Game instance owning the simulation state and the input bitmask
pub struct Game {
    state: GameState,
    keys: u8,
    flap_was_down: bool,
    mouse_point: Option<Pt>,
    callback: Option<EventCallback>,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::standard())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::with_tuning(seed, tuning),
            keys: 0,
            flap_was_down: false,
            mouse_point: None,
            callback: None,
        }
    }

    /// Install the lifecycle event callback
    pub fn on_event(mut self, callback: impl FnMut(GameEvent) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Read-only view of the simulation, valid between frames
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn handle_key_down(&mut self, key: GameKey) {
        self.keys |= key.bit();
    }

    pub fn handle_key_up(&mut self, key: GameKey) {
        self.keys &= !key.bit();
    }

    /// Raw host key codes; unknown codes change nothing
    pub fn handle_raw_key(&mut self, code: u8, down: bool) {
        if let Some(key) = GameKey::from_code(code) {
            if down {
                self.handle_key_down(key);
            } else {
                self.handle_key_up(key);
            }
        }
    }

    /// Record a mouse-down for host-side cosmetics; the simulation
    /// never reads it
    pub fn handle_mouse_down(&mut self, point: Pt) {
        self.mouse_point = Some(point);
    }

    pub fn mouse_point(&self) -> Option<Pt> {
        self.mouse_point
    }

    /// Reset everything and begin a run
    pub fn new_game(&mut self) {
        tick::new_game(&mut self.state);
        self.deliver_events();
    }

    /// Force the run to end
    pub fn end_game(&mut self) {
        tick::end_game(&mut self.state);
        self.deliver_events();
    }

    /// Advance one fixed frame using the current input snapshot
    pub fn update(&mut self) {
        let input = self.snapshot_input();
        tick::tick(&mut self.state, &input);
        self.deliver_events();
    }

    /// Freeze the held-key bitmask into this frame's input, detecting
    /// the flap edge against the previous frame
    fn snapshot_input(&mut self) -> FrameInput {
        let flap_down = self.keys & FLAP_KEYS != 0;
        let flap_pressed = flap_down && !self.flap_was_down;
        self.flap_was_down = flap_down;
        FrameInput {
            left: self.keys & LEFT_KEYS != 0,
            right: self.keys & RIGHT_KEYS != 0,
            flap_held: flap_down,
            flap_pressed,
        }
    }

    fn deliver_events(&mut self) {
        for event in self.state.events.drain(..) {
            if let Some(callback) = self.callback.as_mut() {
                callback(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, PlayerMode};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_flap_is_edge_triggered() {
        let mut game = Game::new(1);
        game.new_game();

        game.handle_key_down(GameKey::Spacebar);
        game.update();
        assert_eq!(game.state().player.mode, PlayerMode::Flying);
        let after_press = game.state().player.v_vel;

        // Held, not re-pressed: only gravity applies
        game.update();
        let impulse = game.state().tuning.player.flap_impulse;
        assert_eq!(
            game.state().player.v_vel,
            after_press + game.state().tuning.player.gravity
        );

        // Release and press again renews the impulse
        game.handle_key_up(GameKey::Spacebar);
        game.update();
        let before = game.state().player.v_vel;
        game.handle_key_down(GameKey::DownArrow);
        game.update();
        let tun = game.state().tuning.player;
        let expected = (before - impulse + tun.gravity).max(-tun.max_v_vel);
        assert_eq!(game.state().player.v_vel, expected);
    }

    #[test]
    fn test_lifecycle_events_reach_the_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut game = Game::new(2).on_event(move |e| sink.borrow_mut().push(e));

        game.new_game();
        game.end_game();
        game.end_game();

        assert_eq!(*seen.borrow(), vec![GameEvent::Started, GameEvent::Ended]);
        assert_eq!(game.state().phase, GamePhase::Attract);
    }

    #[test]
    fn test_unknown_key_codes_are_ignored() {
        let mut game = Game::new(3);
        game.new_game();
        game.handle_raw_key(7, true);
        game.handle_raw_key(255, true);
        game.update();
        assert_eq!(game.state().player.mode, PlayerMode::Idle);
    }

    #[test]
    fn test_mouse_down_is_cosmetic_only() {
        let mut game = Game::new(4);
        game.new_game();
        let before = serde_json::to_string(game.state()).unwrap();
        game.handle_mouse_down(Pt::new(100, 200));
        assert_eq!(game.mouse_point(), Some(Pt::new(100, 200)));
        assert_eq!(serde_json::to_string(game.state()).unwrap(), before);
    }

    #[test]
    fn test_key_codes_round_trip() {
        for key in [
            GameKey::Spacebar,
            GameKey::DownArrow,
            GameKey::LeftArrow,
            GameKey::RightArrow,
            GameKey::KeyA,
            GameKey::KeyS,
            GameKey::Colon,
            GameKey::Quote,
        ] {
            assert_eq!(GameKey::from_code(key.bit()), Some(key));
        }
        assert_eq!(GameKey::from_code(0), None);
        assert_eq!(GameKey::from_code(3), None);
    }
}
