//! Game Sessions
//!
//! Caller-owned context for one game: the round, its leaderboard and the
//! presentation adapter. Sessions apply input through the round's transition
//! function and forward the resulting intents to the [`Presenter`].
//!
//! Lifecycle: `new` deals or arms a round, `reset` tears it down and starts
//! over, `dispose` cancels every timer and hands the presenter back.

use thiserror::Error;
use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::game::intent::{HudField, Intent, RoundSummary, Sound, StepResult};
use crate::game::matching::{self, Animal, CardId, LayoutError, MatchConfig, MatchEvent, MatchState, Visibility};
use crate::game::shooter::{self, Position, ShooterConfig, ShooterEvent, ShooterState, Target, TargetId};
use crate::leaderboard::{Leaderboard, MatchRecord, ShooterRecord};
use crate::storage::Storage;

/// Sound output failures.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio device or the environment does not support synthesis.
    #[error("audio output unavailable")]
    Unavailable,
    /// Tone generation failed.
    #[error("tone synthesis failed: {0}")]
    Synthesis(String),
}

/// Presentation layer driven by a session.
pub trait Presenter {
    /// Draw a card face.
    fn render_card(&mut self, id: CardId, symbol: Animal, visibility: Visibility);

    /// Draw a new target.
    fn render_target(&mut self, target: &Target);

    /// Take a target off screen.
    fn remove_target(&mut self, id: TargetId);

    /// Update a HUD label.
    fn update_hud(&mut self, field: HudField, value: u32);

    /// Play a sound effect.
    fn play_sound(&mut self, sound: &Sound) -> Result<(), AudioError>;

    /// Show the end-of-round overlay with its save-score prompt.
    fn show_round_end(&mut self, summary: &RoundSummary);
}

/// Forward intents to a presenter. Audio failures are dropped.
///
/// Returns true if a round-end overlay was shown.
pub fn dispatch<P: Presenter>(presenter: &mut P, intents: Vec<Intent>) -> bool {
    let mut round_end = false;
    for intent in intents {
        match intent {
            Intent::RenderCard { id, symbol, visibility } => {
                presenter.render_card(id, symbol, visibility)
            }
            Intent::RenderTarget(target) => presenter.render_target(&target),
            Intent::RemoveTarget(id) => presenter.remove_target(id),
            Intent::UpdateHud { field, value } => presenter.update_hud(field, value),
            Intent::PlaySound(sound) => {
                if let Err(e) = presenter.play_sound(&sound) {
                    debug!("Sound {:?} skipped: {}", sound, e);
                }
            }
            Intent::ShowRoundEnd(summary) => {
                presenter.show_round_end(&summary);
                round_end = true;
            }
        }
    }
    round_end
}

/// Keys that activate the focused card.
fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Space")
}

// =============================================================================
// MATCH SESSION
// =============================================================================

/// A Match game on screen.
pub struct MatchSession<P, S> {
    state: MatchState,
    config: MatchConfig,
    leaderboard: Leaderboard<MatchRecord, S>,
    presenter: P,
    awaiting_save: bool,
}

impl<P: Presenter, S: Storage> MatchSession<P, S> {
    /// Deal a round and draw it. Fails if the configured alphabet is empty
    /// or repeats a symbol.
    pub fn new(
        config: MatchConfig,
        rng: DeterministicRng,
        presenter: P,
        storage: S,
    ) -> Result<Self, LayoutError> {
        let state = MatchState::new(&config, rng)?;
        Ok(Self::with_state(state, config, presenter, storage))
    }

    /// Start from a prepared round, e.g. one built with a fixed layout.
    pub fn with_state(state: MatchState, config: MatchConfig, presenter: P, storage: S) -> Self {
        let mut session = Self {
            state,
            config,
            leaderboard: Leaderboard::new(storage),
            presenter,
            awaiting_save: false,
        };
        let redraw = session.state.redraw();
        session.apply(redraw);
        session
    }

    /// Turn a card over. Returns whether the reveal was accepted.
    pub fn reveal(&mut self, id: CardId) -> bool {
        let result = matching::step(&mut self.state, MatchEvent::Reveal(id), &self.config);
        let accepted = result.accepted;
        self.apply(result);
        accepted
    }

    /// Keyboard activation: Enter or Space reveals the focused card.
    pub fn on_key(&mut self, key: &str, focused: Option<CardId>) -> bool {
        match focused {
            Some(id) if is_activation_key(key) => self.reveal(id),
            _ => false,
        }
    }

    /// Let time pass, firing due timers.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let result = matching::advance(&mut self.state, elapsed_ms, &self.config);
        self.apply(result);
    }

    /// Abandon the current round and deal a new one.
    pub fn reset(&mut self) {
        self.awaiting_save = false;
        let result = self.state.reset();
        self.apply(result);
    }

    /// Save the finished round under `name`.
    ///
    /// Only once per won round; returns `None` otherwise.
    pub fn save_score(&mut self, name: &str) -> Option<Vec<MatchRecord>> {
        if !self.awaiting_save {
            return None;
        }
        self.awaiting_save = false;
        let record = MatchRecord::new(name, self.state.moves, self.state.elapsed_secs);
        info!("Saving Match score for {}: {} moves", record.name, record.moves);
        Some(self.leaderboard.submit(record))
    }

    /// Is a won round waiting for a save?
    pub fn can_save(&self) -> bool {
        self.awaiting_save
    }

    /// Current leaderboard, best first.
    pub fn leaderboard(&self) -> Vec<MatchRecord> {
        self.leaderboard.entries()
    }

    /// Wipe the leaderboard.
    pub fn clear_leaderboard(&mut self) {
        self.leaderboard.clear();
    }

    /// Round state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Presentation adapter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Cancel all timers and hand back the presenter.
    pub fn dispose(mut self) -> P {
        self.state.teardown();
        self.presenter
    }

    fn apply(&mut self, result: StepResult) {
        if dispatch(&mut self.presenter, result.intents) {
            self.awaiting_save = true;
        }
    }
}

// =============================================================================
// SHOOTER SESSION
// =============================================================================

/// A Shooter game on screen.
pub struct ShooterSession<P, S> {
    state: ShooterState,
    config: ShooterConfig,
    leaderboard: Leaderboard<ShooterRecord, S>,
    presenter: P,
    awaiting_save: bool,
}

impl<P: Presenter, S: Storage> ShooterSession<P, S> {
    /// Arm an idle round and draw the HUD.
    pub fn new(config: ShooterConfig, rng: DeterministicRng, presenter: P, storage: S) -> Self {
        let state = ShooterState::new(&config, rng);
        let mut session = Self {
            state,
            config,
            leaderboard: Leaderboard::new(storage),
            presenter,
            awaiting_save: false,
        };
        let hud = session.state.reset(&session.config);
        session.apply(hud);
        session
    }

    /// Start a round of the configured length.
    pub fn start(&mut self) -> bool {
        self.start_for(self.config.round_secs)
    }

    /// Start a round of `duration_secs`. Ignored while a round is running.
    pub fn start_for(&mut self, duration_secs: u32) -> bool {
        let result = shooter::step(&mut self.state, ShooterEvent::Start { duration_secs }, &self.config);
        if result.accepted {
            self.awaiting_save = false;
        }
        let accepted = result.accepted;
        self.apply(result);
        accepted
    }

    /// Click a target. Returns whether it scored.
    pub fn hit(&mut self, id: TargetId) -> bool {
        let result = shooter::step(&mut self.state, ShooterEvent::Hit(id), &self.config);
        let accepted = result.accepted;
        self.apply(result);
        accepted
    }

    /// Click on empty arena space.
    pub fn spawn_at(&mut self, position: Position) -> bool {
        let result = shooter::step(&mut self.state, ShooterEvent::SpawnAt(position), &self.config);
        let accepted = result.accepted;
        self.apply(result);
        accepted
    }

    /// Let time pass, firing due timers.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let result = shooter::advance(&mut self.state, elapsed_ms, &self.config);
        self.apply(result);
    }

    /// Stop any round and return to idle.
    pub fn reset(&mut self) {
        self.awaiting_save = false;
        let result = self.state.reset(&self.config);
        self.apply(result);
    }

    /// Save the finished round under `name`.
    ///
    /// Only once per ended round; returns `None` otherwise.
    pub fn save_score(&mut self, name: &str) -> Option<Vec<ShooterRecord>> {
        if !self.awaiting_save {
            return None;
        }
        self.awaiting_save = false;
        let record = ShooterRecord::new(name, self.state.score, self.state.hits);
        info!("Saving Shooter score for {}: {} points", record.name, record.score);
        Some(self.leaderboard.submit(record))
    }

    /// Is an ended round waiting for a save?
    pub fn can_save(&self) -> bool {
        self.awaiting_save
    }

    /// Current leaderboard, best first.
    pub fn leaderboard(&self) -> Vec<ShooterRecord> {
        self.leaderboard.entries()
    }

    /// Wipe the leaderboard.
    pub fn clear_leaderboard(&mut self) {
        self.leaderboard.clear();
    }

    /// Round state.
    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    /// Shooter tuning.
    pub fn config(&self) -> &ShooterConfig {
        &self.config
    }

    /// Presentation adapter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Cancel all timers and hand back the presenter.
    pub fn dispose(mut self) -> P {
        self.state.teardown();
        self.presenter
    }

    fn apply(&mut self, result: StepResult) {
        if dispatch(&mut self.presenter, result.intents) {
            self.awaiting_save = true;
        }
    }
}
