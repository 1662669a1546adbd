//! Input Interpretation
//!
//! Converts the host's per-tick virtual-key bitset into a tick's worth
//! of piece actions: DAS-filtered horizontal movement, gravity selection,
//! edge-triggered rotations, hold, hard drop, and the quit/restart
//! controls. The interpreter owns the DAS charge counter and the
//! previous key state; it runs on every tick regardless of the state
//! machine's phase so held keys never replay as phantom edges.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Uq8p24;
use crate::game::options::Options;
use crate::game::piece::Rotation;
use crate::MS_PER_TICK;

// =============================================================================
// VIRTUAL KEYS
// =============================================================================

/// Bitset of virtual keys held during one tick.
///
/// The bit assignments are part of the replay file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualKeySet(pub u32);

impl VirtualKeySet {
    /// Hard drop
    pub const UP: u32 = 0x01;
    /// Soft drop
    pub const DOWN: u32 = 0x02;
    /// Shift left
    pub const LEFT: u32 = 0x04;
    /// Shift right
    pub const RIGHT: u32 = 0x08;
    /// Anticlockwise rotation
    pub const ROTATE_LEFT: u32 = 0x10;
    /// Clockwise rotation
    pub const ROTATE_RIGHT: u32 = 0x20;
    /// Half rotation
    pub const ROTATE_HALF: u32 = 0x40;
    /// Hold
    pub const HOLD: u32 = 0x80;
    /// Start
    pub const START: u32 = 0x100;
    /// Restart
    pub const RESTART: u32 = 0x200;
    /// Quit
    pub const QUIT: u32 = 0x400;

    /// Empty set.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Whether any of `mask` is held.
    #[inline]
    pub const fn has(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    /// Whether any key at all is held.
    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Keys in `self` that are not in `previous` (press edges).
    #[inline]
    pub const fn edges(self, previous: Self) -> Self {
        Self(self.0 & !previous.0)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// One-shot action flags derived from key edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags(pub u32);

impl ActionFlags {
    /// Drop to the resting row this tick
    pub const HARD_DROP: u32 = 0x01;
    /// Lock this tick
    pub const LOCK: u32 = 0x02;
    /// Swap with the hold slot
    pub const HOLD: u32 = 0x04;
    /// Transition to the Quit terminal state
    pub const QUIT: u32 = 0x08;
    /// Transition to the Restart terminal state
    pub const RESTART: u32 = 0x10;

    /// Whether any of `mask` is set.
    #[inline]
    pub const fn has(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    /// Set `mask`.
    #[inline]
    pub fn set(&mut self, mask: u32) {
        self.0 |= mask;
    }
}

/// Everything the state machine consumes for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    /// Net horizontal movement request in cells (negative = left).
    /// Magnitude can exceed 1 only for instant auto-shift.
    pub movement: i32,
    /// Requested rotation, if any
    pub rotation: Option<Rotation>,
    /// Gravity to accumulate this tick
    pub gravity: Uq8p24,
    /// One-shot extras
    pub extras: ActionFlags,
    /// Press edges this tick (ARE cancellation looks at these)
    pub new_keys: VirtualKeySet,
}

// =============================================================================
// INTERPRETER
// =============================================================================

/// DAS state machine plus edge-detection memory.
///
/// The charge counter is negative while left is charging and positive
/// while right is charging; crossing the configured delay switches to
/// auto-shift at the configured rate (rate 0 = instant to the wall).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputInterpreter {
    das_counter: i32,
    last_keys: VirtualKeySet,
}

impl InputInterpreter {
    /// Fresh interpreter with no held keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys held on the previous tick.
    #[inline]
    pub fn last_keys(&self) -> VirtualKeySet {
        self.last_keys
    }

    /// Current DAS charge (test/diagnostic accessor).
    #[inline]
    pub fn das_counter(&self) -> i32 {
        self.das_counter
    }

    /// Interpret one tick of input. Must be called exactly once per tick.
    pub fn interpret(&mut self, keys: VirtualKeySet, options: &Options) -> Actions {
        let new_keys = keys.edges(self.last_keys);
        let mut actions = Actions {
            new_keys,
            ..Actions::default()
        };

        self.apply_das(keys, options, &mut actions);
        self.apply_gravity(keys, new_keys, options, &mut actions);

        if new_keys.has(VirtualKeySet::ROTATE_LEFT) {
            actions.rotation = Some(Rotation::AntiClockwise);
        }
        if new_keys.has(VirtualKeySet::ROTATE_RIGHT) {
            actions.rotation = Some(Rotation::Clockwise);
        }
        if new_keys.has(VirtualKeySet::ROTATE_HALF) {
            actions.rotation = Some(Rotation::Half);
        }
        if new_keys.has(VirtualKeySet::HOLD) {
            actions.extras.set(ActionFlags::HOLD);
        }
        if new_keys.has(VirtualKeySet::UP) {
            actions.gravity = Uq8p24::from_parts(options.well_height, 0);
            actions.extras.set(ActionFlags::HARD_DROP | ActionFlags::LOCK);
        }
        if new_keys.has(VirtualKeySet::QUIT) {
            actions.extras.set(ActionFlags::QUIT);
        }
        if new_keys.has(VirtualKeySet::RESTART) {
            actions.extras.set(ActionFlags::RESTART);
        }

        self.last_keys = keys;
        actions
    }

    /// DAS: initial tap, charge, then auto-shift (or instant shift when
    /// the rate is zero). Exactly one direction applies; holding both
    /// favors left by check order, and releasing both drains the charge.
    fn apply_das(&mut self, keys: VirtualKeySet, options: &Options, actions: &mut Actions) {
        let delay = crate::ticks_from_ms(options.das_delay_ms) as i32;
        let speed = crate::ticks_from_ms(options.das_speed_ms) as i32;
        let width = options.well_width as i32;

        if keys.has(VirtualKeySet::LEFT) {
            if self.das_counter > -delay {
                if self.das_counter >= 0 {
                    // Fresh press (or direction change): single tap
                    self.das_counter = -1;
                    actions.movement = -1;
                } else {
                    self.das_counter -= 1;
                }
            } else if speed != 0 {
                self.das_counter += speed - 1;
                actions.movement = -1;
            } else {
                actions.movement = -width;
            }
        } else if keys.has(VirtualKeySet::RIGHT) {
            if self.das_counter < delay {
                if self.das_counter <= 0 {
                    self.das_counter = 1;
                    actions.movement = 1;
                } else {
                    self.das_counter += 1;
                }
            } else if speed != 0 {
                self.das_counter -= speed - 1;
                actions.movement = 1;
            } else {
                actions.movement = width;
            }
        } else {
            self.das_counter = 0;
        }
    }

    /// Gravity for the tick. Soft drop replaces the base rate; with
    /// `one_shot_soft_drop` only the press edge drops, otherwise the
    /// held key keeps the fast rate.
    fn apply_gravity(
        &self,
        keys: VirtualKeySet,
        new_keys: VirtualKeySet,
        options: &Options,
        actions: &mut Actions,
    ) {
        let soft_engaged = if options.one_shot_soft_drop {
            new_keys.has(VirtualKeySet::DOWN)
        } else {
            keys.has(VirtualKeySet::DOWN)
        };
        actions.gravity = if soft_engaged {
            Uq8p24::from_ratio(MS_PER_TICK, options.soft_drop_gravity_ms_per_cell)
        } else {
            Uq8p24::from_ratio(MS_PER_TICK, options.gravity_ms_per_cell)
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
