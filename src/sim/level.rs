//! Static level geometry
//!
//! Platform slabs, their walkable touchdown strips, enemy spawn pads,
//! and the altitude bands flying enemies seek. All of it is fixed
//! configuration data; levels vary only in how many ledges are active.

use super::geom::Rect;

/// Total ledges in the full layout
pub const NUM_PLATFORMS: usize = 6;

/// Solid platform slabs, indexed by ledge id. The first two are the
/// banks flanking the lava pit; the last is the high center ledge that
/// drops out on every fourth level.
pub const PLATFORM_RECTS: [Rect; NUM_PLATFORMS] = [
    Rect::new(-2, 418, 154, 462),
    Rect::new(486, 418, 642, 462),
    Rect::new(208, 366, 432, 386),
    Rect::new(-2, 250, 132, 270),
    Rect::new(508, 250, 642, 270),
    Rect::new(232, 148, 408, 168),
];

/// Walkable top strip of each ledge. Inset from the slab so nothing
/// lands or walks on the rounded ends.
pub const TOUCH_DOWN_RECTS: [Rect; NUM_PLATFORMS] = [
    Rect::new(10, 417, 142, 427),
    Rect::new(498, 417, 630, 427),
    Rect::new(220, 365, 420, 375),
    Rect::new(10, 249, 120, 259),
    Rect::new(520, 249, 630, 259),
    Rect::new(244, 147, 396, 157),
];

/// A spawn pad and the ledge it stands on
#[derive(Debug, Clone, Copy)]
pub struct SpawnPad {
    pub rect: Rect,
    pub ledge: usize,
}

/// Enemy spawn pads. The high-center pad is last so the active set is
/// always a prefix of this table.
pub const SPAWN_PADS: [SpawnPad; 5] = [
    SpawnPad {
        rect: Rect::new(30, 202, 78, 250),
        ledge: 3,
    },
    SpawnPad {
        rect: Rect::new(562, 202, 610, 250),
        ledge: 4,
    },
    SpawnPad {
        rect: Rect::new(240, 318, 288, 366),
        ledge: 2,
    },
    SpawnPad {
        rect: Rect::new(58, 370, 106, 418),
        ledge: 0,
    },
    SpawnPad {
        rect: Rect::new(296, 100, 344, 148),
        ledge: 5,
    },
];

/// Target altitudes (entity top coordinates) for flying enemies
pub const ALTITUDE_BANDS: [i32; 4] = [90, 170, 250, 330];

/// Every fourth level loses the high center ledge
pub fn num_ledges_for_level(level_on: u32) -> usize {
    if level_on.is_multiple_of(4) {
        NUM_PLATFORMS - 1
    } else {
        NUM_PLATFORMS
    }
}

/// Active platform slabs for the given ledge count
pub fn platforms(num_ledges: usize) -> &'static [Rect] {
    &PLATFORM_RECTS[..num_ledges]
}

/// Active touchdown strips for the given ledge count
pub fn touch_downs(num_ledges: usize) -> &'static [Rect] {
    &TOUCH_DOWN_RECTS[..num_ledges]
}

/// Spawn pads standing on an active ledge
pub fn spawn_pads(num_ledges: usize) -> &'static [SpawnPad] {
    let active = if num_ledges == NUM_PLATFORMS {
        SPAWN_PADS.len()
    } else {
        SPAWN_PADS.len() - 1
    };
    &SPAWN_PADS[..active]
}
