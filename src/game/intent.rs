//! Round Intents
//!
//! What a round asks the presentation layer to do after each transition:
//! render a card or target, update a HUD label, play a sound, or show the
//! round-end overlay.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::clock::format_clock;
use crate::game::matching::{Animal, CardId, Visibility};
use crate::game::shooter::{Target, TargetId, MAX_VALUE, MIN_VALUE};

/// HUD label a round can update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HudField {
    /// Match: moves taken
    Moves,
    /// Match: pairs matched so far
    Matched,
    /// Match: total pairs on the board
    Pairs,
    /// Match: elapsed seconds
    Elapsed,
    /// Shooter: accumulated score
    Score,
    /// Shooter: targets hit
    Hits,
    /// Shooter: seconds left in the round
    TimeLeft,
}

/// Oscillator shape for a synthesized tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timbre {
    /// Pure sine
    Sine,
    /// Buzzy sawtooth
    Sawtooth,
    /// Soft, bell-like triangle
    Triangle,
    /// Sine with a falling pitch slide through a low-pass filter
    Bubble,
}

/// Parameters for a single synthesized tone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Offset from the start of the sound effect
    pub start_ms: u32,
    /// Oscillator frequency
    pub frequency_hz: f32,
    /// How long the tone rings, envelope included
    pub duration_ms: u32,
    /// Peak gain of the envelope
    pub gain: f32,
    /// Oscillator shape
    pub timbre: Timbre,
}

impl Tone {
    /// Gain used for target pops.
    pub const POP_GAIN: f32 = 0.16;

    fn new(start_ms: u32, frequency_hz: f32, duration_ms: u32, gain: f32, timbre: Timbre) -> Self {
        Self {
            start_ms,
            frequency_hz,
            duration_ms,
            gain,
            timbre,
        }
    }

    /// Pop tone for a target value: higher values sound higher and slightly longer.
    ///
    /// 1 maps to 240 Hz / 130 ms, 10 maps to 735 Hz / 220 ms.
    pub fn for_target_value(value: u8) -> Self {
        let value = value.clamp(MIN_VALUE, MAX_VALUE);
        Self::new(
            0,
            240.0 + f32::from(value - 1) * 55.0,
            120 + 10 * u32::from(value),
            Self::POP_GAIN,
            Timbre::Bubble,
        )
    }
}

/// Matched pair: rising sine arpeggio, 50 ms apart.
const SUCCESS_ARPEGGIO_HZ: [f32; 3] = [880.0, 1100.0, 1320.0];

/// Board cleared: triangle bells stepping up from 880 Hz, in semitones.
const WIN_BELL_BASE_HZ: f32 = 880.0;
const WIN_BELL_STEPS: [i32; 4] = [0, 3, 7, 12];

/// Named sound effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sound {
    /// Short rising chime for a matched pair
    MatchSuccess,
    /// Low buzzer for a mismatched pair
    MatchFail,
    /// Bell sequence when the board is cleared
    Win,
    /// Value-mapped pop when a target is hit
    Pop {
        /// Value of the target that was hit
        value: u8,
        /// Tone to play
        tone: Tone,
    },
}

impl Sound {
    /// Tones that make up this effect, in start order.
    pub fn tones(&self) -> Vec<Tone> {
        match self {
            Sound::MatchSuccess => SUCCESS_ARPEGGIO_HZ
                .iter()
                .zip(0u32..)
                .map(|(hz, i)| Tone::new(i * 50, *hz, 550, 0.12, Timbre::Sine))
                .collect(),
            Sound::MatchFail => vec![Tone::new(0, 180.0, 300, 0.18, Timbre::Sawtooth)],
            Sound::Win => WIN_BELL_STEPS
                .iter()
                .zip(0u32..)
                .map(|(step, i)| {
                    let hz = WIN_BELL_BASE_HZ * 2f32.powf(*step as f32 / 12.0);
                    Tone::new(i * 80, hz, 850, 0.12, Timbre::Triangle)
                })
                .collect(),
            Sound::Pop { tone, .. } => vec![*tone],
        }
    }
}

/// Final figures for a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundSummary {
    /// Board cleared
    Match {
        /// Pair attempts taken
        moves: u32,
        /// Seconds on the clock
        elapsed_secs: u32,
    },
    /// Time ran out
    Shooter {
        /// Points scored
        score: u32,
        /// Targets hit
        hits: u32,
    },
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundSummary::Match { moves, elapsed_secs } => {
                write!(f, "Time {} • {} moves", format_clock(*elapsed_secs), moves)
            }
            RoundSummary::Shooter { score, hits } => {
                write!(f, "Score {} ({} hits)", score, hits)
            }
        }
    }
}

/// A request to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Draw a card face
    RenderCard {
        /// Board position
        id: CardId,
        /// Animal on the face
        symbol: Animal,
        /// Face state to draw
        visibility: Visibility,
    },
    /// Draw a new target
    RenderTarget(Target),
    /// Take a target off screen
    RemoveTarget(TargetId),
    /// Set a HUD label
    UpdateHud {
        /// Label to update
        field: HudField,
        /// New value
        value: u32,
    },
    /// Play a sound effect
    PlaySound(Sound),
    /// Round is over; the player may save a score now
    ShowRoundEnd(RoundSummary),
}

/// Result of applying one event to a round.
#[derive(Debug, Default)]
pub struct StepResult {
    /// Intents produced, in order
    pub intents: Vec<Intent>,
    /// Whether the event changed the round
    pub accepted: bool,
    /// Whether the round finished during this step
    pub round_over: bool,
}

impl StepResult {
    /// An ignored input: no state change, no intents.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// An accepted event with no intents yet.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    pub(crate) fn hud(&mut self, field: HudField, value: u32) {
        self.intents.push(Intent::UpdateHud { field, value });
    }

    pub(crate) fn sound(&mut self, sound: Sound) {
        self.intents.push(Intent::PlaySound(sound));
    }

    /// Fold a later step into this one.
    pub fn absorb(&mut self, other: StepResult) {
        self.intents.extend(other.intents);
        self.accepted |= other.accepted;
        self.round_over |= other.round_over;
    }

    /// Sounds emitted in this step.
    pub fn sounds(&self) -> impl Iterator<Item = &Sound> + '_ {
        self.intents.iter().filter_map(|intent| match intent {
            Intent::PlaySound(sound) => Some(sound),
            _ => None,
        })
    }
}
