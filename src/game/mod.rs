//! Game Logic Module
//!
//! Round state machines for both games. No rendering, no audio, no storage:
//! every transition returns [`StepResult`] intents for the caller to act on.
//!
//! ## Module Structure
//!
//! - `intent`: Render, HUD and sound intents shared by both games
//! - `matching`: Match round (memory cards)
//! - `shooter`: Shooter round (timed targets)

pub mod intent;
pub mod matching;
pub mod shooter;

// Re-export key types
pub use intent::{HudField, Intent, RoundSummary, Sound, StepResult, Timbre, Tone};
pub use matching::{Animal, Card, CardId, MatchConfig, MatchEvent, MatchPhase, MatchState, Visibility};
pub use shooter::{Position, ShooterConfig, ShooterEvent, ShooterPhase, ShooterState, Target, TargetId};
