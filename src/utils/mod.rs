//! Shared utilities
//!
//! Currently just the random number generator used for weight
//! initialization.

pub mod rng;

pub use rng::SimpleRng;
