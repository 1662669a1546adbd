//! Rotation Systems
//!
//! Each system is a pure table set: block offsets per (piece, theta)
//! inside a 4x4 bounding box (origin top-left, y growing downward), and
//! an ordered kick list per (piece, theta, direction). `rotate` walks the
//! kick list and commits the first candidate position that fits.
//!
//! Offsets and kicks follow the published charts for each system. All
//! tables are static data; the systems themselves carry no state, so the
//! sum type is fieldless and `Copy`.

use serde::{Deserialize, Serialize};

use crate::game::piece::{Piece, PieceId, Rotation, Theta};
use crate::game::well::Well;

/// Block offset inside the 4x4 bounding box.
pub type BlockOffset = (u8, u8);

/// Kick translation, y growing downward (negative dy = upward = floorkick).
pub type Kick = (i8, i8);

/// Offsets for one piece: four blocks per orientation.
type PieceOffsets = [[BlockOffset; 4]; 4];

/// Offsets for a whole system, indexed by `PieceId` then `Theta`.
type OffsetTable = [PieceOffsets; 7];

// =============================================================================
// OFFSET TABLES
// =============================================================================

/// SRS orientations (also used by Arika-SRS). JLSTZ pieces live in the
/// top-left 3x3 of the box; I uses the full 4x4.
static SRS_OFFSETS: OffsetTable = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
];

/// Sega orientations (also DTET and both TGM systems): flat-bottom
/// spawns in rows 1..2, T spawns nub-down, S/Z/I alternate two states.
static SEGA_OFFSETS: OffsetTable = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
    ],
    // J
    [
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
    ],
    // L
    [
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
    ],
    // O
    [
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
    ],
    // S
    [
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // T
    [
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
    ],
];

/// Nintendo orientations: identical rows to Sega except the horizontal I
/// sits on the bottom row of its box.
static NES_OFFSETS: OffsetTable = [
    // I
    [
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
    ],
    // J
    [
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
    ],
    // L
    [
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
    ],
    // O
    [
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
        [(1, 1), (2, 1), (1, 2), (2, 2)],
    ],
    // S
    [
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // T
    [
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
    ],
];

// =============================================================================
// KICK TABLES
// =============================================================================

/// The do-nothing kick; Half rotations use this in every system, as do
/// systems without wallkicks.
static KICK_NONE: [Kick; 1] = [(0, 0)];

/// SRS J/L/S/T/Z kicks, clockwise, indexed by the starting theta.
static SRS_KICKS_CW: [[Kick; 5]; 4] = [
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// SRS J/L/S/T/Z kicks, anticlockwise.
static SRS_KICKS_CCW: [[Kick; 5]; 4] = [
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// SRS I kicks, clockwise.
static SRS_I_KICKS_CW: [[Kick; 5]; 4] = [
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

/// SRS I kicks, anticlockwise.
static SRS_I_KICKS_CCW: [[Kick; 5]; 4] = [
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
];

/// Arika I kicks, clockwise. The Arika variant reorders the last two SRS
/// candidates so the I piece can climb out of wells it would otherwise
/// slide under.
static ARIKA_I_KICKS_CW: [[Kick; 5]; 4] = [
    [(0, 0), (-2, 0), (1, 0), (1, -2), (-2, 1)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 1)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

/// Arika I kicks, anticlockwise.
static ARIKA_I_KICKS_CCW: [[Kick; 5]; 4] = [
    [(0, 0), (2, 0), (-1, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
];

/// DTET symmetric 6-kick list, clockwise. Downward kicks are legal here.
static DTET_KICKS_CW: [Kick; 6] = [(0, 0), (1, 0), (-1, 0), (0, 1), (1, 1), (-1, 1)];

/// DTET symmetric 6-kick list, anticlockwise (mirror of clockwise).
static DTET_KICKS_CCW: [Kick; 6] = [(0, 0), (-1, 0), (1, 0), (0, 1), (-1, 1), (1, 1)];

/// Classic TGM kicks: in place, right, left.
static TGM_KICKS: [Kick; 3] = [(0, 0), (1, 0), (-1, 0)];

/// TGM3 T kicks: classic list plus a single floorkick.
static TGM3_KICKS_T: [Kick; 4] = [(0, 0), (1, 0), (-1, 0), (0, -1)];

/// TGM3 I kicks: classic list plus two floorkick rows.
static TGM3_KICKS_I: [Kick; 5] = [(0, 0), (1, 0), (-1, 0), (0, -1), (0, -2)];

// =============================================================================
// ROTATION SYSTEM
// =============================================================================

/// The rotation system in effect for a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationSystem {
    /// Standard Rotation System
    #[default]
    Srs,
    /// SRS with the Arika I-piece kick variant
    ArikaSrs,
    /// Sega rotation, no kicks
    Sega,
    /// Nintendo rotation, no kicks
    Nes,
    /// DTET symmetric kicks
    Dtet,
    /// TGM1/TGM2: Sega orientations, right/left kicks, centre-column rule
    Tgm,
    /// TGM3: TGM plus T/I floorkicks
    Tgm3,
}

impl RotationSystem {
    /// Block offsets for `(piece, theta)` in the 4x4 box.
    #[inline]
    pub fn blocks(self, id: PieceId, theta: Theta) -> &'static [BlockOffset; 4] {
        let table: &OffsetTable = match self {
            RotationSystem::Srs | RotationSystem::ArikaSrs => &SRS_OFFSETS,
            RotationSystem::Sega
            | RotationSystem::Dtet
            | RotationSystem::Tgm
            | RotationSystem::Tgm3 => &SEGA_OFFSETS,
            RotationSystem::Nes => &NES_OFFSETS,
        };
        &table[id.index()][theta.index()]
    }

    /// Ordered kick candidates for `(piece, theta, rotation)`.
    fn kicks(self, id: PieceId, theta: Theta, rotation: Rotation) -> &'static [Kick] {
        if matches!(rotation, Rotation::Half) {
            return &KICK_NONE;
        }
        let cw = matches!(rotation, Rotation::Clockwise);
        match self {
            RotationSystem::Srs => match id {
                PieceId::O => &KICK_NONE,
                PieceId::I => {
                    if cw {
                        &SRS_I_KICKS_CW[theta.index()]
                    } else {
                        &SRS_I_KICKS_CCW[theta.index()]
                    }
                }
                _ => {
                    if cw {
                        &SRS_KICKS_CW[theta.index()]
                    } else {
                        &SRS_KICKS_CCW[theta.index()]
                    }
                }
            },
            RotationSystem::ArikaSrs => match id {
                PieceId::O => &KICK_NONE,
                PieceId::I => {
                    if cw {
                        &ARIKA_I_KICKS_CW[theta.index()]
                    } else {
                        &ARIKA_I_KICKS_CCW[theta.index()]
                    }
                }
                _ => {
                    if cw {
                        &SRS_KICKS_CW[theta.index()]
                    } else {
                        &SRS_KICKS_CCW[theta.index()]
                    }
                }
            },
            RotationSystem::Sega | RotationSystem::Nes => &KICK_NONE,
            RotationSystem::Dtet => {
                if cw {
                    &DTET_KICKS_CW
                } else {
                    &DTET_KICKS_CCW
                }
            }
            RotationSystem::Tgm => &TGM_KICKS,
            RotationSystem::Tgm3 => match id {
                PieceId::T => &TGM3_KICKS_T,
                PieceId::I => &TGM3_KICKS_I,
                _ => &TGM_KICKS,
            },
        }
    }

    /// TGM centre-column rule: J/L/T at a horizontal orientation may not
    /// kick while the centre column of their 3-wide box is obstructed.
    /// Exception: an occupied cell over the piece's short shoulder frees
    /// the kick so it can climb a one-cell step (L at R0 left shoulder,
    /// J at R0 right shoulder).
    fn tgm_kick_allowed(self, well: &Well, piece: &Piece) -> bool {
        if !matches!(self, RotationSystem::Tgm | RotationSystem::Tgm3) {
            return true;
        }
        let horizontal = matches!(piece.theta, Theta::R0 | Theta::R180);
        if !horizontal || !matches!(piece.id, PieceId::J | PieceId::L | PieceId::T) {
            return true;
        }
        // Placed blocks only; the floor and walls are not centre
        // obstructions (otherwise grounded pieces could never floorkick)
        let cx = piece.x as i32 + 1;
        let blocked = (0..3).any(|dy| well.cell(cx, piece.y as i32 + dy).is_some());
        if !blocked {
            return true;
        }
        match (piece.id, piece.theta) {
            (PieceId::L, Theta::R0) => well.cell(piece.x as i32, piece.y as i32).is_some(),
            (PieceId::J, Theta::R0) => well.cell(piece.x as i32 + 2, piece.y as i32).is_some(),
            _ => false,
        }
    }

    /// Attempt a rotation with wallkicks. On success the piece has moved
    /// (fraction of `y_actual` preserved, resting row recomputed) and any
    /// floorkick has been charged against `floorkick_limit`.
    pub fn rotate(
        self,
        well: &Well,
        piece: &mut Piece,
        rotation: Rotation,
        floorkick_limit: u32,
        lock_ticks: u32,
    ) -> bool {
        let new_theta = piece.theta.rotate(rotation);
        for (i, &(dx, dy)) in self.kicks(piece.id, piece.theta, rotation).iter().enumerate() {
            if i > 0 && !self.tgm_kick_allowed(well, piece) {
                return false;
            }
            let nx = piece.x as i32 + dx as i32;
            let ny = piece.y as i32 + dy as i32;
            if well.is_collision(self, piece.id, nx, ny, new_theta) {
                continue;
            }
            piece.handle_floorkick(dy < 0, floorkick_limit, lock_ticks);
            piece.move_to(well, self, nx as i8, ny as i8, new_theta);
            return true;
        }
        false
    }
}

// =============================================================================
// TESTS
// =============================================================================
