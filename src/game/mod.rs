//! Game logic (deterministic).
//!
//! Everything under here is a pure function of the engine state and the
//! per-tick key bitset: piece geometry, the well, randomizers, rotation
//! systems, DAS interpretation, options, and the tick state machine.

pub mod input;
pub mod options;
pub mod piece;
pub mod randomizer;
pub mod rotation;
pub mod state;
pub mod tick;
pub mod well;
