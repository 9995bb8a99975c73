//! Shooter Round
//!
//! Timed target popping. Targets worth 1 to 10 points float up the arena;
//! higher values are smaller and rise more slowly. The round keeps up to
//! `max_targets` alive, tops them up on a fixed cadence, and ends when the
//! countdown reaches zero.
//!
//! ## Phases
//!
//! ```text
//! Idle ──Start──▶ Running ──countdown hits 0──▶ Ended ──Start──▶ Running
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, trace};

use crate::core::rng::DeterministicRng;
use crate::core::schedule::{Scheduler, TaskHandle};
use crate::game::intent::{HudField, Intent, RoundSummary, Sound, StepResult, Tone};

/// Lowest target value.
pub const MIN_VALUE: u8 = 1;
/// Highest target value.
pub const MAX_VALUE: u8 = 10;

/// Size of a value-1 target (px).
const MAX_SIZE: f32 = 110.0;
/// Size of a value-10 target (px).
const MIN_SIZE: f32 = 50.0;
/// Rise time of a value-1 target.
const MIN_RISE_MS: u32 = 3000;
/// Extra rise time of a value-10 target over a value-1 target.
const RISE_SPAN_MS: u32 = 5000;

/// Target diameter in pixels for a value. Strictly decreasing over 1..=10.
pub fn target_size(value: u8) -> u32 {
    let steps = f32::from(value.clamp(MIN_VALUE, MAX_VALUE) - MIN_VALUE);
    let per_step = (MAX_SIZE - MIN_SIZE) / f32::from(MAX_VALUE - MIN_VALUE);
    (MAX_SIZE - steps * per_step).round() as u32
}

/// Rise duration in milliseconds for a value. Strictly increasing over 1..=10.
pub fn rise_duration_ms(value: u8) -> u32 {
    let steps = u32::from(value.clamp(MIN_VALUE, MAX_VALUE) - MIN_VALUE);
    MIN_RISE_MS + steps * RISE_SPAN_MS / u32::from(MAX_VALUE - MIN_VALUE)
}

// =============================================================================
// GEOMETRY / TARGETS
// =============================================================================

/// Top-left corner of a target, in arena pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    /// Pixels from the left edge
    pub x: f32,
    /// Pixels from the top edge
    pub y: f32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Arena size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Arena width in px
    pub width: f32,
    /// Arena height in px
    pub height: f32,
}

impl Bounds {
    /// Footprint reserved for a randomly placed target: 12% of the width,
    /// kept between 48 and 84 px.
    pub fn spawn_footprint(&self) -> f32 {
        (self.width * 0.12).clamp(48.0, 84.0)
    }
}

/// Unique target identifier. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// A live target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Identifier for hits and removal
    pub id: TargetId,
    /// Points awarded on hit
    pub value: u8,
    /// Top-left corner in the arena
    pub position: Position,
    /// Diameter in px
    pub size: u32,
    /// Time to float up to its resting spot
    pub rise_duration_ms: u32,
    /// Time until the target expires unclicked
    pub lifetime_ms: u32,
    #[serde(skip)]
    expiry: Option<TaskHandle>,
}

// =============================================================================
// CONFIG / EVENTS
// =============================================================================

/// Tuning for a Shooter round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Default round length
    pub round_secs: u32,
    /// Countdown resolution
    pub countdown_interval_ms: u64,
    /// Replenishment cadence
    pub spawn_interval_ms: u64,
    /// Live targets kept on screen by replenishment
    pub max_targets: usize,
    /// Arena size
    pub arena: Bounds,
    /// Gap between random spawns and the arena edge
    pub edge_padding: f32,
    /// Allow pointer clicks on empty space to spawn a target
    pub click_spawn: bool,
    /// Gap between click spawns and the arena edge
    pub click_margin: f32,
    /// Lower bound on target lifetime
    pub min_lifetime_ms: u32,
    /// Lifetime beyond the rise duration
    pub lifetime_grace_ms: u32,
    /// Random extra lifetime, uniform in [0, jitter)
    pub lifetime_jitter_ms: u32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            round_secs: 30,
            countdown_interval_ms: 1000,
            spawn_interval_ms: 900,
            max_targets: 6,
            arena: Bounds { width: 800.0, height: 480.0 },
            edge_padding: 20.0,
            click_spawn: true,
            click_margin: 8.0,
            min_lifetime_ms: 2200,
            lifetime_grace_ms: 800,
            lifetime_jitter_ms: 800,
        }
    }
}

/// Input to the Shooter transition function.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShooterEvent {
    /// Begin a round of the given length
    Start {
        /// Round length in seconds
        duration_secs: u32,
    },
    /// Player clicked a target
    Hit(TargetId),
    /// One countdown interval elapsed
    Tick,
    /// Replenishment cadence elapsed
    Replenish,
    /// A target's lifetime ran out
    Expire(TargetId),
    /// Player clicked empty arena space
    SpawnAt(Position),
}

/// Current phase of a Shooter round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShooterPhase {
    /// Waiting for Start
    #[default]
    Idle,
    /// Countdown running, targets live
    Running,
    /// Time ran out; score is final
    Ended,
}

// =============================================================================
// SHOOTER STATE
// =============================================================================

/// One Shooter round.
#[derive(Clone, Debug)]
pub struct ShooterState {
    /// Current phase
    pub phase: ShooterPhase,
    /// Live targets (BTreeMap for stable iteration order)
    pub targets: BTreeMap<TargetId, Target>,
    /// Sum of hit target values
    pub score: u32,
    /// Targets hit
    pub hits: u32,
    /// Countdown remaining
    pub seconds_left: u32,
    /// Pending delayed events
    pub timers: Scheduler<ShooterEvent>,
    countdown: Option<TaskHandle>,
    spawner: Option<TaskHandle>,
    next_target_id: u64,
    rng: DeterministicRng,
}

impl ShooterState {
    /// Create an idle round.
    pub fn new(config: &ShooterConfig, rng: DeterministicRng) -> Self {
        Self {
            phase: ShooterPhase::Idle,
            targets: BTreeMap::new(),
            score: 0,
            hits: 0,
            seconds_left: config.round_secs,
            timers: Scheduler::new(),
            countdown: None,
            spawner: None,
            next_target_id: 0,
            rng,
        }
    }

    /// Is a round in progress?
    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == ShooterPhase::Running
    }

    /// Look up a live target.
    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(&id)
    }

    /// Summary of the round so far.
    pub fn summary(&self) -> RoundSummary {
        RoundSummary::Shooter {
            score: self.score,
            hits: self.hits,
        }
    }

    /// Cancel every pending timer.
    pub fn teardown(&mut self) {
        let cancelled = self.timers.teardown();
        self.countdown = None;
        self.spawner = None;
        for target in self.targets.values_mut() {
            target.expiry = None;
        }
        if cancelled > 0 {
            debug!("Shooter teardown cancelled {} timers", cancelled);
        }
    }

    /// Stop the round and return to idle with zeroed counters.
    pub fn reset(&mut self, config: &ShooterConfig) -> StepResult {
        self.teardown();
        let mut result = StepResult::accepted();
        self.clear_targets(&mut result);
        self.phase = ShooterPhase::Idle;
        self.score = 0;
        self.hits = 0;
        self.seconds_left = config.round_secs;

        result.hud(HudField::Score, self.score);
        result.hud(HudField::Hits, self.hits);
        result.hud(HudField::TimeLeft, self.seconds_left);
        result
    }

    /// Place a target with a chosen value, e.g. for scripted rounds.
    ///
    /// Returns `None` unless the round is running.
    pub fn place_target(
        &mut self,
        value: u8,
        position: Position,
        config: &ShooterConfig,
    ) -> Option<(TargetId, StepResult)> {
        if !self.is_running() {
            return None;
        }
        let mut result = StepResult::accepted();
        let id = self.spawn(value, position, config, &mut result);
        Some((id, result))
    }

    fn spawn(
        &mut self,
        value: u8,
        position: Position,
        config: &ShooterConfig,
        result: &mut StepResult,
    ) -> TargetId {
        let value = value.clamp(MIN_VALUE, MAX_VALUE);
        let id = TargetId(self.next_target_id);
        self.next_target_id += 1;

        let rise = rise_duration_ms(value);
        let jitter = self.rng.next_int(config.lifetime_jitter_ms);
        let lifetime = config
            .min_lifetime_ms
            .max(rise + config.lifetime_grace_ms + jitter);
        let expiry = self.timers.schedule_after(u64::from(lifetime), ShooterEvent::Expire(id));

        let target = Target {
            id,
            value,
            position,
            size: target_size(value),
            rise_duration_ms: rise,
            lifetime_ms: lifetime,
            expiry: Some(expiry),
        };
        trace!("Spawned target {:?} worth {}", id, value);
        result.push(Intent::RenderTarget(target.clone()));
        self.targets.insert(id, target);
        id
    }

    fn random_value(&mut self) -> u8 {
        self.rng.next_int_range(i32::from(MIN_VALUE), i32::from(MAX_VALUE)) as u8
    }

    fn random_position(&mut self, config: &ShooterConfig) -> Position {
        let arena = config.arena;
        let pad = config.edge_padding;
        let footprint = arena.spawn_footprint();
        Position {
            x: self.rng.next_f32_range(pad, arena.width - footprint - pad),
            y: self.rng.next_f32_range(pad, arena.height - footprint - pad),
        }
    }

    fn replenish(&mut self, config: &ShooterConfig, result: &mut StepResult) {
        let missing = config.max_targets.saturating_sub(self.targets.len());
        for _ in 0..missing {
            let value = self.random_value();
            let position = self.random_position(config);
            self.spawn(value, position, config, result);
        }
    }

    fn clear_targets(&mut self, result: &mut StepResult) {
        for (id, target) in std::mem::take(&mut self.targets) {
            if let Some(expiry) = target.expiry {
                self.timers.cancel(expiry);
            }
            result.push(Intent::RemoveTarget(id));
        }
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Apply one event to the round.
pub fn step(state: &mut ShooterState, event: ShooterEvent, config: &ShooterConfig) -> StepResult {
    match event {
        ShooterEvent::Start { duration_secs } => start(state, duration_secs, config),
        ShooterEvent::Hit(id) => hit(state, id),
        ShooterEvent::Tick => tick_countdown(state, config),
        ShooterEvent::Replenish => replenish_tick(state, config),
        ShooterEvent::Expire(id) => expire(state, id),
        ShooterEvent::SpawnAt(position) => spawn_at(state, position, config),
    }
}

/// Let `elapsed_ms` of time pass, firing every timer that comes due.
pub fn advance(state: &mut ShooterState, elapsed_ms: u64, config: &ShooterConfig) -> StepResult {
    let until = state.timers.now_ms().saturating_add(elapsed_ms);
    let mut result = StepResult::default();

    while let Some((_, event)) = state.timers.pop_due(until) {
        result.absorb(step(state, event, config));
    }
    state.timers.settle_at(until);

    result
}

fn start(state: &mut ShooterState, duration_secs: u32, config: &ShooterConfig) -> StepResult {
    if state.is_running() {
        trace!("Start ignored, round already running");
        return StepResult::ignored();
    }

    state.teardown();
    let mut result = StepResult::accepted();
    state.clear_targets(&mut result);

    state.phase = ShooterPhase::Running;
    state.score = 0;
    state.hits = 0;
    state.seconds_left = duration_secs;
    result.hud(HudField::Score, 0);
    result.hud(HudField::Hits, 0);
    result.hud(HudField::TimeLeft, duration_secs);

    state.replenish(config, &mut result);
    state.spawner = Some(state.timers.schedule_after(config.spawn_interval_ms, ShooterEvent::Replenish));
    state.countdown = Some(state.timers.schedule_after(config.countdown_interval_ms, ShooterEvent::Tick));

    info!("Shooter round started: {}s", duration_secs);
    result
}

fn hit(state: &mut ShooterState, id: TargetId) -> StepResult {
    if !state.is_running() {
        trace!("Hit {:?} ignored, round not running", id);
        return StepResult::ignored();
    }
    let Some(target) = state.targets.remove(&id) else {
        trace!("Hit {:?} ignored, target gone", id);
        return StepResult::ignored();
    };
    if let Some(expiry) = target.expiry {
        state.timers.cancel(expiry);
    }

    state.score += u32::from(target.value);
    state.hits += 1;

    let mut result = StepResult::accepted();
    result.sound(Sound::Pop {
        value: target.value,
        tone: Tone::for_target_value(target.value),
    });
    result.push(Intent::RemoveTarget(id));
    result.hud(HudField::Score, state.score);
    result.hud(HudField::Hits, state.hits);
    result
}

fn tick_countdown(state: &mut ShooterState, config: &ShooterConfig) -> StepResult {
    if !state.is_running() {
        return StepResult::ignored();
    }
    if let Some(countdown) = state.countdown.take() {
        state.timers.cancel(countdown);
    }

    state.seconds_left = state.seconds_left.saturating_sub(1);
    let mut result = StepResult::accepted();
    result.hud(HudField::TimeLeft, state.seconds_left);

    if state.seconds_left == 0 {
        end_round(state, &mut result);
    } else {
        state.countdown = Some(state.timers.schedule_after(config.countdown_interval_ms, ShooterEvent::Tick));
    }
    result
}

fn end_round(state: &mut ShooterState, result: &mut StepResult) {
    state.phase = ShooterPhase::Ended;
    state.teardown();
    state.clear_targets(result);
    result.push(Intent::ShowRoundEnd(state.summary()));
    result.round_over = true;
    info!("Shooter round ended: score {}, hits {}", state.score, state.hits);
}

fn replenish_tick(state: &mut ShooterState, config: &ShooterConfig) -> StepResult {
    if !state.is_running() {
        return StepResult::ignored();
    }
    if let Some(spawner) = state.spawner.take() {
        state.timers.cancel(spawner);
    }

    let mut result = StepResult::accepted();
    state.replenish(config, &mut result);
    state.spawner = Some(state.timers.schedule_after(config.spawn_interval_ms, ShooterEvent::Replenish));
    result
}

fn expire(state: &mut ShooterState, id: TargetId) -> StepResult {
    let Some(target) = state.targets.remove(&id) else {
        return StepResult::ignored();
    };
    if let Some(expiry) = target.expiry {
        state.timers.cancel(expiry);
    }

    let mut result = StepResult::accepted();
    result.push(Intent::RemoveTarget(id));
    result
}

fn spawn_at(state: &mut ShooterState, pointer: Position, config: &ShooterConfig) -> StepResult {
    if !state.is_running() || !config.click_spawn {
        return StepResult::ignored();
    }

    let value = state.random_value();
    let size = target_size(value) as f32;
    let margin = config.click_margin;
    let arena = config.arena;
    // Centre on the pointer, then keep inside the arena
    let position = Position {
        x: (pointer.x - size / 2.0).min(arena.width - size - margin).max(margin),
        y: (pointer.y - size / 2.0).min(arena.height - size - margin).max(margin),
    };

    let mut result = StepResult::accepted();
    state.spawn(value, position, config, &mut result);
    result
}
