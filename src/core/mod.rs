//! Deterministic primitives.
//!
//! Everything in here is integer-only and platform independent: the
//! UQ8.24 gravity accumulator, the JSF32 PRNG, the fixed-capacity preview
//! ring, and the state hasher used for replay verification.

pub mod fixed;
pub mod hash;
pub mod queue;
pub mod rng;
