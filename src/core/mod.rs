//! Core primitives shared by both games.
//!
//! Randomness, the task scheduler that stands in for timer callbacks, and
//! clock formatting.

pub mod rng;
pub mod schedule;
pub mod clock;

// Re-export core types
pub use rng::DeterministicRng;
pub use schedule::{Scheduler, TaskHandle};
pub use clock::{format_clock, parse_clock};
