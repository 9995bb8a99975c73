//! Match Round
//!
//! Memory card game: twelve face-down cards, six animals, find the pairs.
//!
//! ## Phases
//!
//! ```text
//! Idle ──first reveal──▶ Running ──second card, mismatch──▶ ResolvingPair
//!                          ▲  │                                  │
//!                          │  └──last pair matched──▶ Won        │
//!                          └───────────PairSettled───────────────┘
//! ```
//!
//! All transitions go through [`step`]. Delayed work (the 1 Hz clock, the
//! mismatch revert, the win overlay) is scheduled on the round's own
//! [`Scheduler`] and fed back through [`step`] by [`advance`].

use serde::{Serialize, Deserialize};
use tracing::{debug, info, trace};

use crate::core::rng::DeterministicRng;
use crate::core::schedule::{Scheduler, TaskHandle};
use crate::game::intent::{HudField, Intent, RoundSummary, Sound, StepResult};

// =============================================================================
// CARDS
// =============================================================================

/// Card symbol alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Animal {
    /// 🦊
    Fox = 0,
    /// 🐼
    Panda = 1,
    /// 🐻
    Bear = 2,
    /// 🐯
    Tiger = 3,
    /// 🐨
    Koala = 4,
    /// 🐵
    Monkey = 5,
}

impl Animal {
    /// The full alphabet, in board-legend order.
    pub const ALL: [Animal; 6] = [
        Animal::Fox,
        Animal::Panda,
        Animal::Bear,
        Animal::Tiger,
        Animal::Koala,
        Animal::Monkey,
    ];

    /// Emoji shown on the card face.
    pub fn glyph(self) -> &'static str {
        match self {
            Animal::Fox => "🦊",
            Animal::Panda => "🐼",
            Animal::Bear => "🐻",
            Animal::Tiger => "🐯",
            Animal::Koala => "🐨",
            Animal::Monkey => "🐵",
        }
    }
}

/// Board position of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub usize);

/// Face state of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Visibility {
    /// Face down
    #[default]
    Hidden,
    /// Face up, waiting for its partner
    Revealed,
    /// Paired and locked face up
    Matched,
}

/// A single card on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Board position
    pub id: CardId,
    /// Animal on the face
    pub symbol: Animal,
    /// Face state
    pub visibility: Visibility,
}

/// Rejected board layouts.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// No cards at all.
    #[error("layout has no cards")]
    Empty,
    /// A symbol does not appear exactly twice.
    #[error("{symbol:?} appears {count} times, every symbol must appear exactly twice")]
    NotPaired {
        /// Offending symbol
        symbol: Animal,
        /// How often it appears
        count: usize,
    },
    /// A symbol is listed more than once in the alphabet.
    #[error("{0:?} is listed more than once")]
    DuplicateSymbol(Animal),
}

/// Check a deck alphabet: at least one symbol, none repeated.
pub fn validate_symbols(symbols: &[Animal]) -> Result<(), LayoutError> {
    if symbols.is_empty() {
        return Err(LayoutError::Empty);
    }
    for (index, symbol) in symbols.iter().enumerate() {
        if symbols[..index].contains(symbol) {
            return Err(LayoutError::DuplicateSymbol(*symbol));
        }
    }
    Ok(())
}

/// Build a shuffled deck: every symbol twice, Fisher-Yates order.
pub fn build_deck(symbols: &[Animal], rng: &mut DeterministicRng) -> Result<Vec<Card>, LayoutError> {
    validate_symbols(symbols)?;
    Ok(deal(symbols, rng))
}

fn deal(symbols: &[Animal], rng: &mut DeterministicRng) -> Vec<Card> {
    let mut layout: Vec<Animal> = symbols.iter().chain(symbols.iter()).copied().collect();
    rng.shuffle(&mut layout);
    cards_from_layout(&layout)
}

fn cards_from_layout(layout: &[Animal]) -> Vec<Card> {
    layout
        .iter()
        .enumerate()
        .map(|(index, symbol)| Card {
            id: CardId(index),
            symbol: *symbol,
            visibility: Visibility::Hidden,
        })
        .collect()
}

fn validate_layout(layout: &[Animal]) -> Result<(), LayoutError> {
    if layout.is_empty() {
        return Err(LayoutError::Empty);
    }
    for symbol in Animal::ALL {
        let count = layout.iter().filter(|s| **s == symbol).count();
        if count != 0 && count != 2 {
            return Err(LayoutError::NotPaired { symbol, count });
        }
    }
    Ok(())
}

// =============================================================================
// CONFIG / EVENTS
// =============================================================================

/// Tuning for a Match round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// How long a mismatched pair stays face up before flipping back
    pub mismatch_delay_ms: u64,
    /// Pause between the last match and the win overlay
    pub win_settle_ms: u64,
    /// Elapsed clock resolution
    pub clock_interval_ms: u64,
    /// Symbols dealt onto the board, each twice
    pub symbols: Vec<Animal>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mismatch_delay_ms: 700,
            win_settle_ms: 400,
            clock_interval_ms: 1000,
            symbols: Animal::ALL.to_vec(),
        }
    }
}

/// Input to the Match transition function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Player turned a card over
    Reveal(CardId),
    /// One clock interval elapsed
    Tick,
    /// Mismatch delay elapsed; flip the pending pair back
    PairSettled,
    /// Win settle elapsed; show the overlay
    WinSettled,
}

/// Current phase of a Match round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatchPhase {
    /// Board dealt, clock stopped
    #[default]
    Idle,
    /// Accepting reveals
    Running,
    /// Two mismatched cards are face up; reveals are rejected
    ResolvingPair,
    /// Every pair matched
    Won,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// One Match round.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Current phase
    pub phase: MatchPhase,
    /// Board, indexed by `CardId`
    pub cards: Vec<Card>,
    /// Revealed cards awaiting comparison (0, 1 or 2)
    pub pending: Vec<CardId>,
    /// Completed pair attempts
    pub moves: u32,
    /// Pairs found
    pub matched_pairs: u32,
    /// Seconds since the first reveal
    pub elapsed_secs: u32,
    /// Pending delayed events
    pub timers: Scheduler<MatchEvent>,
    clock: Option<TaskHandle>,
    settle: Option<TaskHandle>,
    win_shown: bool,
    symbols: Vec<Animal>,
    rng: DeterministicRng,
}

impl MatchState {
    /// Deal a fresh round from the configured alphabet.
    pub fn new(config: &MatchConfig, mut rng: DeterministicRng) -> Result<Self, LayoutError> {
        let cards = build_deck(&config.symbols, &mut rng)?;
        Ok(Self::from_cards(cards, config.symbols.clone(), rng))
    }

    /// Deal a round with a fixed card order.
    ///
    /// Later resets shuffle the same symbols using `rng`.
    pub fn with_layout(layout: &[Animal], rng: DeterministicRng) -> Result<Self, LayoutError> {
        validate_layout(layout)?;
        let mut symbols: Vec<Animal> = Vec::new();
        for symbol in layout {
            if !symbols.contains(symbol) {
                symbols.push(*symbol);
            }
        }
        Ok(Self::from_cards(cards_from_layout(layout), symbols, rng))
    }

    fn from_cards(cards: Vec<Card>, symbols: Vec<Animal>, rng: DeterministicRng) -> Self {
        Self {
            phase: MatchPhase::Idle,
            cards,
            pending: Vec::with_capacity(2),
            moves: 0,
            matched_pairs: 0,
            elapsed_secs: 0,
            timers: Scheduler::new(),
            clock: None,
            settle: None,
            win_shown: false,
            symbols,
            rng,
        }
    }

    /// Number of pairs on the board.
    pub fn total_pairs(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    /// True while a mismatched pair is waiting to flip back.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.phase == MatchPhase::ResolvingPair
    }

    /// Is the elapsed clock running?
    pub fn clock_running(&self) -> bool {
        self.clock.is_some()
    }

    /// Look up a card.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    /// Summary of the round so far.
    pub fn summary(&self) -> RoundSummary {
        RoundSummary::Match {
            moves: self.moves,
            elapsed_secs: self.elapsed_secs,
        }
    }

    /// Cancel every pending timer.
    pub fn teardown(&mut self) {
        let cancelled = self.timers.teardown();
        self.clock = None;
        self.settle = None;
        if cancelled > 0 {
            debug!("Match teardown cancelled {} timers", cancelled);
        }
    }

    /// Stop timers, zero counters and deal a new board.
    ///
    /// Returns the intents that redraw the board and HUD.
    pub fn reset(&mut self) -> StepResult {
        self.teardown();
        self.cards = deal(&self.symbols, &mut self.rng);
        self.phase = MatchPhase::Idle;
        self.pending.clear();
        self.moves = 0;
        self.matched_pairs = 0;
        self.elapsed_secs = 0;
        self.win_shown = false;

        self.redraw()
    }

    /// Intents that draw the whole board and HUD as they stand.
    pub fn redraw(&self) -> StepResult {
        let mut result = StepResult::accepted();
        for card in &self.cards {
            result.push(render(card));
        }
        result.hud(HudField::Pairs, self.total_pairs());
        result.hud(HudField::Moves, self.moves);
        result.hud(HudField::Matched, self.matched_pairs);
        result.hud(HudField::Elapsed, self.elapsed_secs);
        result
    }
}

fn render(card: &Card) -> Intent {
    Intent::RenderCard {
        id: card.id,
        symbol: card.symbol,
        visibility: card.visibility,
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Apply one event to the round.
pub fn step(state: &mut MatchState, event: MatchEvent, config: &MatchConfig) -> StepResult {
    match event {
        MatchEvent::Reveal(id) => reveal(state, id, config),
        MatchEvent::Tick => tick_clock(state, config),
        MatchEvent::PairSettled => settle_pair(state),
        MatchEvent::WinSettled => settle_win(state),
    }
}

/// Let `elapsed_ms` of time pass, firing every timer that comes due.
pub fn advance(state: &mut MatchState, elapsed_ms: u64, config: &MatchConfig) -> StepResult {
    let until = state.timers.now_ms().saturating_add(elapsed_ms);
    let mut result = StepResult::default();

    while let Some((_, event)) = state.timers.pop_due(until) {
        result.absorb(step(state, event, config));
    }
    state.timers.settle_at(until);

    result
}

fn reveal(state: &mut MatchState, id: CardId, config: &MatchConfig) -> StepResult {
    if matches!(state.phase, MatchPhase::ResolvingPair | MatchPhase::Won) {
        trace!("Reveal {:?} ignored in phase {:?}", id, state.phase);
        return StepResult::ignored();
    }
    let Some(card) = state.cards.get_mut(id.0) else {
        trace!("Reveal of unknown card {:?} ignored", id);
        return StepResult::ignored();
    };
    if card.visibility != Visibility::Hidden {
        trace!("Reveal {:?} ignored, card is {:?}", id, card.visibility);
        return StepResult::ignored();
    }

    let mut result = StepResult::accepted();

    card.visibility = Visibility::Revealed;
    result.push(render(card));
    state.pending.push(id);

    if state.phase == MatchPhase::Idle {
        state.phase = MatchPhase::Running;
        state.clock = Some(state.timers.schedule_after(config.clock_interval_ms, MatchEvent::Tick));
        debug!("Match clock started");
    }

    if state.pending.len() == 2 {
        resolve_pair(state, config, &mut result);
    }

    result
}

fn resolve_pair(state: &mut MatchState, config: &MatchConfig, result: &mut StepResult) {
    state.moves += 1;
    result.hud(HudField::Moves, state.moves);

    let (a, b) = (state.pending[0], state.pending[1]);
    if state.cards[a.0].symbol == state.cards[b.0].symbol {
        for id in [a, b] {
            let card = &mut state.cards[id.0];
            card.visibility = Visibility::Matched;
            result.push(render(card));
        }
        state.pending.clear();
        state.matched_pairs += 1;
        result.hud(HudField::Matched, state.matched_pairs);
        result.sound(Sound::MatchSuccess);

        if state.matched_pairs == state.total_pairs() {
            if let Some(clock) = state.clock.take() {
                state.timers.cancel(clock);
            }
            state.phase = MatchPhase::Won;
            state.settle = Some(state.timers.schedule_after(config.win_settle_ms, MatchEvent::WinSettled));
            result.round_over = true;
            info!("Match won in {} moves, {}s", state.moves, state.elapsed_secs);
        }
    } else {
        state.phase = MatchPhase::ResolvingPair;
        state.settle = Some(state.timers.schedule_after(config.mismatch_delay_ms, MatchEvent::PairSettled));
        result.sound(Sound::MatchFail);
    }
}

fn tick_clock(state: &mut MatchState, config: &MatchConfig) -> StepResult {
    let Some(clock) = state.clock.take() else {
        return StepResult::ignored();
    };
    // No-op when this tick is the one that just fired
    state.timers.cancel(clock);

    state.elapsed_secs += 1;
    state.clock = Some(state.timers.schedule_after(config.clock_interval_ms, MatchEvent::Tick));

    let mut result = StepResult::accepted();
    result.hud(HudField::Elapsed, state.elapsed_secs);
    result
}

fn settle_pair(state: &mut MatchState) -> StepResult {
    if state.phase != MatchPhase::ResolvingPair {
        return StepResult::ignored();
    }
    if let Some(settle) = state.settle.take() {
        state.timers.cancel(settle);
    }

    let mut result = StepResult::accepted();
    for id in state.pending.drain(..) {
        let card = &mut state.cards[id.0];
        card.visibility = Visibility::Hidden;
        result.push(render(card));
    }
    state.phase = MatchPhase::Running;
    result
}

fn settle_win(state: &mut MatchState) -> StepResult {
    if state.phase != MatchPhase::Won || state.win_shown {
        return StepResult::ignored();
    }
    if let Some(settle) = state.settle.take() {
        state.timers.cancel(settle);
    }
    state.win_shown = true;

    let mut result = StepResult::accepted();
    result.sound(Sound::Win);
    result.push(Intent::ShowRoundEnd(state.summary()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use super::Animal::*;

    // 🦊 at 0 and 5, 🐼 at 1, 🐻 at 2
    const LAYOUT: [Animal; 12] = [
        Fox, Panda, Bear, Tiger, Koala, Fox, Monkey, Panda, Bear, Tiger, Koala, Monkey,
    ];

    fn fixed_round() -> (MatchState, MatchConfig) {
        let state = MatchState::with_layout(&LAYOUT, DeterministicRng::new(7)).unwrap();
        (state, MatchConfig::default())
    }

    fn reveal_pair(state: &mut MatchState, config: &MatchConfig, a: usize, b: usize) -> StepResult {
        let mut result = step(state, MatchEvent::Reveal(CardId(a)), config);
        result.absorb(step(state, MatchEvent::Reveal(CardId(b)), config));
        result
    }

    fn solve(state: &mut MatchState, config: &MatchConfig) {
        for symbol in Animal::ALL {
            let ids: Vec<usize> = state
                .cards
                .iter()
                .filter(|c| c.symbol == symbol)
                .map(|c| c.id.0)
                .collect();
            reveal_pair(state, config, ids[0], ids[1]);
        }
    }

    #[test]
    fn test_deck_pairs_every_symbol() {
        let state = MatchState::new(&MatchConfig::default(), DeterministicRng::new(99)).unwrap();

        assert_eq!(state.cards.len(), 12);
        assert_eq!(state.total_pairs(), 6);
        for symbol in Animal::ALL {
            assert_eq!(state.cards.iter().filter(|c| c.symbol == symbol).count(), 2);
        }
        for (index, card) in state.cards.iter().enumerate() {
            assert_eq!(card.id, CardId(index));
            assert_eq!(card.visibility, Visibility::Hidden);
        }
    }

    #[test]
    fn test_layout_validation() {
        assert_eq!(
            MatchState::with_layout(&[], DeterministicRng::new(1)).unwrap_err(),
            LayoutError::Empty
        );
        assert_eq!(
            MatchState::with_layout(&[Fox, Fox, Fox, Panda], DeterministicRng::new(1)).unwrap_err(),
            LayoutError::NotPaired { symbol: Fox, count: 3 }
        );
        assert!(MatchState::with_layout(&[Koala, Fox, Fox, Koala], DeterministicRng::new(1)).is_ok());
    }

    #[test]
    fn test_configured_alphabet_is_checked() {
        let mut config = MatchConfig::default();

        config.symbols = Vec::new();
        assert_eq!(
            MatchState::new(&config, DeterministicRng::new(1)).unwrap_err(),
            LayoutError::Empty
        );

        config.symbols = vec![Fox, Panda, Fox];
        assert_eq!(
            MatchState::new(&config, DeterministicRng::new(1)).unwrap_err(),
            LayoutError::DuplicateSymbol(Fox)
        );

        config.symbols = vec![Tiger, Koala];
        let state = MatchState::new(&config, DeterministicRng::new(1)).unwrap();
        assert_eq!(state.cards.len(), 4);
        assert_eq!(state.total_pairs(), 2);
    }

    #[test]
    fn test_reset_keeps_fixed_layout_symbols() {
        let mut state = MatchState::with_layout(&[Koala, Fox, Fox, Koala], DeterministicRng::new(4)).unwrap();
        state.reset();

        assert_eq!(state.cards.len(), 4);
        for symbol in [Koala, Fox] {
            assert_eq!(state.cards.iter().filter(|c| c.symbol == symbol).count(), 2);
        }
    }

    #[test]
    fn test_first_reveal_starts_clock() {
        let (mut state, config) = fixed_round();
        assert_eq!(state.phase, MatchPhase::Idle);
        assert!(!state.clock_running());

        // Time passing before the first reveal does nothing
        advance(&mut state, 5000, &config);
        assert_eq!(state.elapsed_secs, 0);

        step(&mut state, MatchEvent::Reveal(CardId(3)), &config);
        assert_eq!(state.phase, MatchPhase::Running);
        assert!(state.clock_running());

        advance(&mut state, 3500, &config);
        assert_eq!(state.elapsed_secs, 3);
    }

    #[test]
    fn test_matching_pair() {
        let (mut state, config) = fixed_round();

        let result = reveal_pair(&mut state, &config, 0, 5);

        assert!(result.accepted);
        assert_eq!(state.card(CardId(0)).unwrap().visibility, Visibility::Matched);
        assert_eq!(state.card(CardId(5)).unwrap().visibility, Visibility::Matched);
        assert_eq!(state.matched_pairs, 1);
        assert_eq!(state.moves, 1);
        assert!(state.pending.is_empty());
        assert_eq!(result.sounds().collect::<Vec<_>>(), vec![&Sound::MatchSuccess]);
    }

    #[test]
    fn test_mismatch_reverts_after_delay() {
        let (mut state, config) = fixed_round();

        let result = reveal_pair(&mut state, &config, 1, 2);
        assert!(state.is_busy());
        assert_eq!(state.moves, 1);
        assert_eq!(result.sounds().collect::<Vec<_>>(), vec![&Sound::MatchFail]);

        // Not yet
        advance(&mut state, 699, &config);
        assert!(state.is_busy());
        assert_eq!(state.card(CardId(1)).unwrap().visibility, Visibility::Revealed);

        advance(&mut state, 1, &config);
        assert!(!state.is_busy());
        assert_eq!(state.phase, MatchPhase::Running);
        assert_eq!(state.card(CardId(1)).unwrap().visibility, Visibility::Hidden);
        assert_eq!(state.card(CardId(2)).unwrap().visibility, Visibility::Hidden);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_third_reveal_while_resolving_is_noop() {
        let (mut state, config) = fixed_round();
        reveal_pair(&mut state, &config, 1, 2);

        let before_cards = state.cards.clone();
        let before_pending = state.pending.clone();
        let result = step(&mut state, MatchEvent::Reveal(CardId(3)), &config);

        assert!(!result.accepted);
        assert!(result.intents.is_empty());
        assert_eq!(result.sounds().count(), 0);
        assert_eq!(state.cards, before_cards);
        assert_eq!(state.pending, before_pending);
        assert_eq!(state.moves, 1);
    }

    #[test]
    fn test_revealed_and_matched_cards_are_rejected() {
        let (mut state, config) = fixed_round();
        reveal_pair(&mut state, &config, 0, 5);

        let result = step(&mut state, MatchEvent::Reveal(CardId(0)), &config);
        assert!(!result.accepted);

        step(&mut state, MatchEvent::Reveal(CardId(3)), &config);
        let result = step(&mut state, MatchEvent::Reveal(CardId(3)), &config);
        assert!(!result.accepted);
        assert_eq!(state.pending, vec![CardId(3)]);

        let result = step(&mut state, MatchEvent::Reveal(CardId(40)), &config);
        assert!(!result.accepted);
    }

    #[test]
    fn test_clock_keeps_running_while_resolving() {
        let (mut state, config) = fixed_round();
        reveal_pair(&mut state, &config, 1, 2);

        advance(&mut state, 2000, &config);
        assert_eq!(state.elapsed_secs, 2);
    }

    #[test]
    fn test_won_exactly_on_last_pair() {
        let (mut state, config) = fixed_round();
        // Two misses first
        reveal_pair(&mut state, &config, 1, 2);
        advance(&mut state, 700, &config);
        reveal_pair(&mut state, &config, 3, 4);
        advance(&mut state, 700, &config);

        let pairs = [(0, 5), (1, 7), (2, 8), (3, 9), (4, 10)];
        for (a, b) in pairs {
            let result = reveal_pair(&mut state, &config, a, b);
            assert!(!result.round_over);
            assert_ne!(state.phase, MatchPhase::Won);
        }

        let result = reveal_pair(&mut state, &config, 6, 11);
        assert!(result.round_over);
        assert_eq!(state.phase, MatchPhase::Won);
        assert_eq!(state.matched_pairs, state.total_pairs());
        assert_eq!(state.moves, 8);
        assert!(!state.clock_running());
    }

    #[test]
    fn test_win_overlay_after_settle() {
        let (mut state, config) = fixed_round();
        step(&mut state, MatchEvent::Reveal(CardId(0)), &config);
        advance(&mut state, 2000, &config);
        solve(&mut state, &config);

        let early = advance(&mut state, 399, &config);
        assert!(early.intents.is_empty());

        let result = advance(&mut state, 1, &config);
        assert_eq!(result.sounds().collect::<Vec<_>>(), vec![&Sound::Win]);
        assert!(result.intents.contains(&Intent::ShowRoundEnd(RoundSummary::Match {
            moves: 6,
            elapsed_secs: 2,
        })));

        // Clock is frozen after the win
        advance(&mut state, 10_000, &config);
        assert_eq!(state.elapsed_secs, 2);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_reset_cancels_pending_revert() {
        let (mut state, config) = fixed_round();
        reveal_pair(&mut state, &config, 1, 2);
        assert!(state.is_busy());

        state.reset();
        assert_eq!(state.phase, MatchPhase::Idle);
        assert!(state.timers.is_empty());

        // Start the fresh round, then let the old revert's due time pass
        let first = state.cards[0].symbol;
        let partner = state.cards.iter().skip(1).find(|c| c.symbol != first).unwrap().id;
        step(&mut state, MatchEvent::Reveal(CardId(0)), &config);
        let result = advance(&mut state, 700, &config);

        assert!(result.intents.iter().all(|i| !matches!(i, Intent::RenderCard { .. })));
        assert_eq!(state.card(CardId(0)).unwrap().visibility, Visibility::Revealed);
        assert_eq!(state.pending, vec![CardId(0)]);

        // A stray settle event is also ignored outside ResolvingPair
        let result = step(&mut state, MatchEvent::PairSettled, &config);
        assert!(!result.accepted);
        assert!(state.card(partner).unwrap().visibility == Visibility::Hidden);
    }

    #[test]
    fn test_reset_zeroes_round() {
        let (mut state, config) = fixed_round();
        reveal_pair(&mut state, &config, 0, 5);
        advance(&mut state, 3000, &config);

        let result = state.reset();

        assert_eq!(state.moves, 0);
        assert_eq!(state.matched_pairs, 0);
        assert_eq!(state.elapsed_secs, 0);
        assert!(!state.clock_running());
        assert!(state.cards.iter().all(|c| c.visibility == Visibility::Hidden));
        let renders = result
            .intents
            .iter()
            .filter(|i| matches!(i, Intent::RenderCard { .. }))
            .count();
        assert_eq!(renders, 12);
    }

    #[test]
    fn test_zero_clock_interval_still_advances() {
        let (mut state, _) = fixed_round();
        let config = MatchConfig {
            clock_interval_ms: 0,
            ..MatchConfig::default()
        };
        step(&mut state, MatchEvent::Reveal(CardId(0)), &config);

        // Ticks are pushed to at least one millisecond apart
        advance(&mut state, 3, &config);
        assert_eq!(state.elapsed_secs, 3);
    }

    #[test]
    fn test_stray_tick_without_clock_is_ignored() {
        let (mut state, config) = fixed_round();
        let result = step(&mut state, MatchEvent::Tick, &config);
        assert!(!result.accepted);
        assert_eq!(state.elapsed_secs, 0);
    }

    proptest! {
        #[test]
        fn deck_is_always_paired(seed in any::<u64>()) {
            let config = MatchConfig::default();
            let state = MatchState::new(&config, DeterministicRng::new(seed)).unwrap();
            let mut symbols: Vec<Animal> = state.cards.iter().map(|c| c.symbol).collect();
            symbols.sort();
            let mut expected: Vec<Animal> = Animal::ALL.iter().chain(Animal::ALL.iter()).copied().collect();
            expected.sort();
            prop_assert_eq!(symbols, expected);
        }

        #[test]
        fn won_only_when_all_pairs_found(seed in any::<u64>(), picks in proptest::collection::vec(0usize..12, 0..80)) {
            let config = MatchConfig::default();
            let mut state = MatchState::new(&config, DeterministicRng::new(seed)).unwrap();
            for pick in picks {
                step(&mut state, MatchEvent::Reveal(CardId(pick)), &config);
                advance(&mut state, 700, &config);
                prop_assert_eq!(
                    state.phase == MatchPhase::Won,
                    state.matched_pairs == state.total_pairs()
                );
            }
        }
    }
}
