//! # Arcade Rounds
//!
//! Round logic and local leaderboards for two casual games: **Match**
//! (memory cards) and **Shooter** (timed target popping).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ARCADE ROUNDS                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── rng.rs      - Seedable Xorshift128+ PRNG, shuffle       │
//! │  ├── schedule.rs - Virtual-time task scheduler               │
//! │  └── clock.rs    - mm:ss formatting                          │
//! │                                                              │
//! │  game/           - Round state machines (no I/O)             │
//! │  ├── intent.rs   - Render / HUD / sound intents              │
//! │  ├── matching.rs - Match round                               │
//! │  └── shooter.rs  - Shooter round                             │
//! │                                                              │
//! │  storage.rs      - Key/value backends (memory, files)        │
//! │  leaderboard.rs  - Top-10 ranking and retention              │
//! │  session.rs      - Caller-owned sessions + Presenter trait   │
//! │  config.rs       - JSON configuration                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Event Model
//!
//! Rounds never read the system clock and never block. Input events and
//! timer firings both go through a transition function
//! (`step(&mut state, event, &config) -> StepResult`); delayed work sits on
//! the round's own scheduler and is released by `advance(elapsed_ms)`.
//! Resetting a round tears down every pending timer at once.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod storage;
pub mod leaderboard;
pub mod session;
pub mod config;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::core::schedule::{Scheduler, TaskHandle};
pub use crate::game::intent::{Intent, StepResult};
pub use crate::game::matching::{MatchConfig, MatchState};
pub use crate::game::shooter::{ShooterConfig, ShooterState};
pub use crate::leaderboard::{Leaderboard, MatchRecord, ShooterRecord};
pub use crate::session::{MatchSession, Presenter, ShooterSession};
pub use crate::storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use crate::config::ArcadeConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
