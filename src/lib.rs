//! # Stackwell
//!
//! Deterministic falling-block stacking engine with bit-exact replays.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        STACKWELL                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                │
//! │  ├── fixed.rs     - UQ8.24 fixed-point gravity accumulator  │
//! │  ├── rng.rs       - Jenkins small-fast PRNG (JSF32)         │
//! │  ├── queue.rs     - Fixed-capacity preview ring             │
//! │  └── hash.rs      - State hashing for verification          │
//! │                                                             │
//! │  game/            - Game logic (deterministic)              │
//! │  ├── piece.rs     - Piece identities and geometry           │
//! │  ├── well.rs      - Playing field and line clearing         │
//! │  ├── randomizer.rs- Bag / NES / TGM piece randomizers       │
//! │  ├── rotation.rs  - SRS / Sega / DTET / TGM kick tables     │
//! │  ├── input.rs     - Virtual keys and DAS interpretation     │
//! │  ├── options.rs   - Configuration and ini parsing           │
//! │  ├── state.rs     - Engine state and snapshots              │
//! │  └── tick.rs      - The per-tick state machine              │
//! │                                                             │
//! │  replay/          - Recording codec (ZS1 format)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The engine is a pure function of (options, seed, key stream):
//! - No floating-point arithmetic anywhere in the simulation
//! - Gravity accumulates in UQ8.24 integer math
//! - All randomness flows from one seeded JSF32
//! - Within a tick the state-machine dispatch order is fixed
//!
//! Feed two engines the same options and per-tick key bitsets and their
//! state hashes match on every tick, on every platform. A replay file is
//! just the options plus the input edges.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod replay;

// Re-export commonly used types
pub use crate::core::fixed::Uq8p24;
pub use crate::core::hash::StateHash;
pub use crate::core::rng::SmallRng;
pub use crate::game::input::VirtualKeySet;
pub use crate::game::options::{Options, OptionsError};
pub use crate::game::state::{Engine, EngineSnapshot, State, Stats};
pub use crate::game::tick::tick;
pub use crate::replay::{read_replay, write_replay, ReplayInput, ReplayPlayer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed timestep length in milliseconds
pub const MS_PER_TICK: u32 = 16;

/// Ticks per rendered frame in the host loop
pub const TICKS_PER_DRAW_FRAME: u32 = 2;

/// Convert a millisecond option value to whole ticks.
#[inline]
pub const fn ticks_from_ms(ms: u32) -> u32 {
    ms / MS_PER_TICK
}
