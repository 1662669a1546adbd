//! UQ8.24 Fixed-Point Arithmetic
//!
//! Deterministic fractional accumulation for gravity. All operations use
//! integer arithmetic only - no floats anywhere in the simulation.
//!
//! ## Format: UQ8.24
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: UQ8.24 (32-bit unsigned integer)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [IIIIIIII][FFFFFFFFFFFFFFFFFFFFFFFF]                       │
//! │   └ 8 bits ┘└──────── 24 bits ───────┘                      │
//! │                                                             │
//! │  Range: 0.0 to 255.99999994                                 │
//! │  Precision: 1/16777216 ≈ 0.00000006 cells                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why UQ8.24?
//!
//! - A piece's vertical position never leaves [0, 25), so 8 integer bits
//!   are plenty while 24 fraction bits keep sub-cell gravity exact
//! - Addition is plain wrapping u32 addition, identical on every platform
//! - The fraction survives horizontal moves and rotations untouched, so
//!   gravity accumulates bit-exactly across a whole game

use serde::{Deserialize, Serialize};

/// Number of fractional bits (24)
pub const FRACTION_BITS: u32 = 24;

/// Mask selecting the fractional part
pub const FRACTION_MASK: u32 = (1 << FRACTION_BITS) - 1;

/// UQ8.24 fixed-point number stored as u32.
/// 8 bits integer, 24 bits fractional.
///
/// # Determinism
///
/// Addition wraps exactly like unsigned 32-bit addition. Integer overflow
/// past 255 is defined (wrap), but gravity per tick is bounded well below
/// the well height so it never occurs in play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Uq8p24(u32);

impl Uq8p24 {
    /// Zero constant
    pub const ZERO: Self = Self(0);

    /// 1.0 in fixed-point
    pub const ONE: Self = Self(1 << FRACTION_BITS);

    /// Build from an integer part and a raw 24-bit fraction.
    #[inline]
    pub const fn from_parts(whole: u8, fraction: u32) -> Self {
        Self(((whole as u32) << FRACTION_BITS) | (fraction & FRACTION_MASK))
    }

    /// Build from a ratio: floor((a << 24) / b).
    ///
    /// Used for per-tick gravity: `from_ratio(ms_per_tick, ms_per_cell)`.
    /// Returns zero when `b == 0` (no gravity) rather than panicking.
    #[inline]
    pub const fn from_ratio(a: u32, b: u32) -> Self {
        if b == 0 {
            return Self(0);
        }
        Self((((a as u64) << FRACTION_BITS) / b as u64) as u32)
    }

    /// Reinterpret a raw u32 bit pattern.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw bit pattern.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Integer part (0..=255).
    #[inline]
    pub const fn integer(self) -> u8 {
        (self.0 >> FRACTION_BITS) as u8
    }

    /// Fractional part as a raw 24-bit value.
    #[inline]
    pub const fn fraction(self) -> u32 {
        self.0 & FRACTION_MASK
    }

    /// Wrapping addition, identical to unsigned 32-bit addition.
    #[inline]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0.wrapping_add(other.0))
    }

    /// Replace the integer part, keeping the fraction.
    #[inline]
    pub const fn with_integer(self, whole: u8) -> Self {
        Self::from_parts(whole, self.fraction())
    }
}

// =============================================================================
// TESTS
// =============================================================================
