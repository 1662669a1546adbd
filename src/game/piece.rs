//! Piece Entities
//!
//! The seven tetromino identities, the four orientations, rotation
//! directions, and the falling-piece entity with its gravity accumulator
//! and lock bookkeeping.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Uq8p24;
use crate::game::rotation::RotationSystem;
use crate::game::well::Well;

/// Number of distinct piece identities.
pub const PIECE_COUNT: usize = 7;

// =============================================================================
// PIECE ID
// =============================================================================

/// Piece identity. The declaration order is the serialization order:
/// I < J < L < O < S < T < Z maps to indices 0..6.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceId {
    /// Index 0
    #[default]
    I = 0,
    /// Index 1
    J = 1,
    /// Index 2
    L = 2,
    /// Index 3
    O = 3,
    /// Index 4
    S = 4,
    /// Index 5
    T = 5,
    /// Index 6
    Z = 6,
}

/// All pieces in serialization order.
pub const ALL_PIECES: [PieceId; PIECE_COUNT] = [
    PieceId::I,
    PieceId::J,
    PieceId::L,
    PieceId::O,
    PieceId::S,
    PieceId::T,
    PieceId::Z,
];

impl PieceId {
    /// Serialization index (0..6).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Piece from serialization index.
    pub fn from_index(index: u32) -> Option<PieceId> {
        ALL_PIECES.get(index as usize).copied()
    }

    /// One-letter name, as used in option values and logs.
    pub fn name(self) -> &'static str {
        match self {
            PieceId::I => "I",
            PieceId::J => "J",
            PieceId::L => "L",
            PieceId::O => "O",
            PieceId::S => "S",
            PieceId::T => "T",
            PieceId::Z => "Z",
        }
    }
}

// =============================================================================
// ORIENTATION
// =============================================================================

/// Rotation direction, as a theta delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum Rotation {
    /// +1 quarter turn
    Clockwise = 1,
    /// -1 quarter turn
    AntiClockwise = -1,
    /// +2 quarter turns
    Half = 2,
}

/// One of the four 90-degree orientations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Theta {
    /// Spawn orientation
    #[default]
    R0 = 0,
    /// One clockwise quarter turn
    R90 = 1,
    /// Half turn
    R180 = 2,
    /// One anticlockwise quarter turn
    R270 = 3,
}

/// All orientations in index order.
pub const ALL_THETAS: [Theta; 4] = [Theta::R0, Theta::R90, Theta::R180, Theta::R270];

impl Theta {
    /// Orientation index (0..3).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Compose with a rotation, modulo 4.
    #[inline]
    pub fn rotate(self, rotation: Rotation) -> Theta {
        ALL_THETAS[(self as i8 + rotation as i8).rem_euclid(4) as usize]
    }
}

// =============================================================================
// FALLING PIECE
// =============================================================================

/// The current falling piece.
///
/// Invariants (checked by the tick loop, relied on by the renderer):
/// - `y_actual.integer() == y` after every tick
/// - `y <= y_hard_drop`, and `y_hard_drop` is the resting row for the
///   current `(x, theta)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Identity
    pub id: PieceId,
    /// Column of the bounding box origin
    pub x: i8,
    /// Row of the bounding box origin
    pub y: i8,
    /// Sub-cell vertical position; gravity accumulates here
    pub y_actual: Uq8p24,
    /// Resting row for the current column/orientation
    pub y_hard_drop: i8,
    /// Orientation
    pub theta: Theta,
    /// Ticks spent landed; locks when it reaches the lock delay
    pub lock_timer: u32,
    /// Floorkicks consumed by this piece
    pub floorkick_count: u32,
}

impl Piece {
    /// Create a piece at an explicit position and compute its resting row.
    pub fn new(well: &Well, rs: RotationSystem, id: PieceId, x: i8, y: i8, theta: Theta) -> Self {
        let mut piece = Self {
            id,
            x,
            y,
            y_actual: Uq8p24::from_parts(y.max(0) as u8, 0),
            y_hard_drop: y,
            theta,
            lock_timer: 0,
            floorkick_count: 0,
        };
        piece.recompute_hard_drop(well, rs);
        piece
    }

    /// Create a piece at the spawn position: `x = width/2 - 1, y = 1, R0`.
    pub fn spawn(well: &Well, rs: RotationSystem, id: PieceId) -> Self {
        let x = (well.width() / 2) as i8 - 1;
        Self::new(well, rs, id, x, 1, Theta::R0)
    }

    /// Whether the piece collides at its own position (spawn top-out check).
    pub fn is_blocked(&self, well: &Well, rs: RotationSystem) -> bool {
        well.is_collision(rs, self.id, self.x as i32, self.y as i32, self.theta)
    }

    /// Move to a new position/orientation after a successful kick or shift.
    ///
    /// Preserves the fractional part of `y_actual` so gravity keeps
    /// accumulating smoothly, and recomputes the resting row.
    pub fn move_to(&mut self, well: &Well, rs: RotationSystem, x: i8, y: i8, theta: Theta) {
        self.x = x;
        self.y = y;
        self.theta = theta;
        self.y_actual = self.y_actual.with_integer(y.max(0) as u8);
        self.recompute_hard_drop(well, rs);
    }

    /// Walk downward from the current row to find the resting row.
    pub fn recompute_hard_drop(&mut self, well: &Well, rs: RotationSystem) {
        let mut rest = self.y as i32;
        while !well.is_collision(rs, self.id, self.x as i32, rest + 1, self.theta) {
            rest += 1;
        }
        self.y_hard_drop = rest as i8;
    }

    /// Account for a floorkick. When the configured limit is reached the
    /// lock timer is forced to `lock_ticks` so the piece locks this tick.
    pub fn handle_floorkick(&mut self, is_floorkick: bool, floorkick_limit: u32, lock_ticks: u32) {
        if !is_floorkick || floorkick_limit == 0 {
            return;
        }
        self.floorkick_count += 1;
        if self.floorkick_count >= floorkick_limit {
            self.lock_timer = lock_ticks;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
