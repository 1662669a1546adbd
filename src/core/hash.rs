//! State Hashing for Verification
//!
//! Deterministic hashing of engine state, used to:
//! - Compare twin simulations in the determinism tests
//! - Verify that a replayed game reproduced the recorded one
//!
//! The digest is not part of the replay file format; it is a cheap
//! equality check over snapshots.

use sha2::{Digest, Sha256};

use super::fixed::Uq8p24;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for engine state.
///
/// Wraps SHA-256 with helpers for the engine's scalar types. Order of
/// updates is critical: callers must fold fields in one fixed order.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for full engine state.
    pub fn for_engine_state() -> Self {
        Self::new(b"STACKWELL_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with an i8 value.
    #[inline]
    pub fn update_i8(&mut self, value: i8) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a UQ8.24 value.
    #[inline]
    pub fn update_fixed(&mut self, value: Uq8p24) {
        self.update_u32(value.raw());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

// =============================================================================
// TESTS
// =============================================================================
