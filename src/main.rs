//! Arcade Demo
//!
//! Plays one scripted round of each game against a logging presenter and a
//! file-backed leaderboard, then prints both leaderboards.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use arcade::{
    VERSION, ArcadeConfig, DeterministicRng, FileStorage, MatchSession, ShooterSession,
    game::{
        intent::{HudField, RoundSummary, Sound},
        matching::{Animal, CardId, Visibility},
        shooter::{Position, Target, TargetId},
    },
    session::{AudioError, Presenter},
};

/// Config file picked up from the working directory when present.
const CONFIG_FILE: &str = "arcade.json";

/// Presenter that writes everything to the log.
struct LogPresenter {
    game: &'static str,
}

impl Presenter for LogPresenter {
    fn render_card(&mut self, id: CardId, symbol: Animal, visibility: Visibility) {
        debug!("[{}] card {} {} {:?}", self.game, id.0, symbol.glyph(), visibility);
    }

    fn render_target(&mut self, target: &Target) {
        debug!(
            "[{}] target {} worth {} at ({:.0}, {:.0}), {}px, rises in {}ms",
            self.game, target.id.0, target.value, target.position.x, target.position.y,
            target.size, target.rise_duration_ms
        );
    }

    fn remove_target(&mut self, id: TargetId) {
        debug!("[{}] target {} gone", self.game, id.0);
    }

    fn update_hud(&mut self, field: HudField, value: u32) {
        debug!("[{}] hud {:?} = {}", self.game, field, value);
    }

    fn play_sound(&mut self, sound: &Sound) -> Result<(), AudioError> {
        for tone in sound.tones() {
            debug!(
                "[{}] tone +{}ms {:.0}Hz {:?} for {}ms",
                self.game, tone.start_ms, tone.frequency_hz, tone.timbre, tone.duration_ms
            );
        }
        Ok(())
    }

    fn show_round_end(&mut self, summary: &RoundSummary) {
        info!("[{}] round over: {}", self.game, summary);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Arcade Rounds v{}", VERSION);

    let config = if Path::new(CONFIG_FILE).exists() {
        ArcadeConfig::load(CONFIG_FILE).context("loading arcade.json")?
    } else {
        ArcadeConfig::default()
    };

    let storage_dir = config.storage_dir();
    let storage = FileStorage::open(&storage_dir)
        .with_context(|| format!("opening leaderboard directory {}", storage_dir.display()))?;
    info!("Leaderboards in {}", storage_dir.display());

    demo_match(&config, storage.clone())?;
    demo_shooter(&config, storage);

    Ok(())
}

/// Play a Match round with one deliberate miss, then save it.
fn demo_match(config: &ArcadeConfig, storage: FileStorage) -> anyhow::Result<()> {
    info!("=== Match ===");

    let presenter = LogPresenter { game: "match" };
    let mut session = MatchSession::new(
        config.matching.clone(),
        DeterministicRng::from_entropy(),
        presenter,
        storage,
    )
    .context("dealing the Match board")?;

    // Find pairs by peeking at the board
    let cards = session.state().cards.clone();
    let partner = |index: usize| {
        cards
            .iter()
            .find(|c| c.id.0 != index && c.symbol == cards[index].symbol)
            .map(|c| c.id)
    };

    // Miss once: the first card against a card of another symbol
    if let Some(other) = cards.iter().find(|c| c.symbol != cards[0].symbol) {
        session.reveal(CardId(0));
        session.reveal(other.id);
        session.advance(config.matching.mismatch_delay_ms);
    }

    for card in &cards {
        if let Some(pair) = partner(card.id.0) {
            session.reveal(card.id);
            session.reveal(pair);
        }
        session.advance(1200);
    }
    session.advance(config.matching.win_settle_ms);

    if let Some(list) = session.save_score("Demo") {
        for (rank, record) in list.iter().enumerate() {
            info!("#{} {} - {} moves, {}s", rank + 1, record.name, record.moves, record.time);
        }
    }
    session.dispose();
    Ok(())
}

/// Play a Shooter round, always popping the most valuable target.
fn demo_shooter(config: &ArcadeConfig, storage: FileStorage) {
    info!("=== Shooter ===");

    let presenter = LogPresenter { game: "shooter" };
    let mut session = ShooterSession::new(
        config.shooter.clone(),
        DeterministicRng::from_entropy(),
        presenter,
        storage,
    );
    session.start();

    let mut clicks = 0u32;
    while session.state().is_running() {
        let best = session
            .state()
            .targets
            .values()
            .max_by_key(|t| t.value)
            .map(|t| t.id);
        if let Some(id) = best {
            session.hit(id);
        }
        clicks += 1;
        if clicks % 10 == 0 {
            // Tap the middle of the arena now and then
            let arena = session.config().arena;
            session.spawn_at(Position::new(arena.width / 2.0, arena.height / 2.0));
        }
        session.advance(650);
    }

    if let Some(list) = session.save_score("Demo") {
        for (rank, record) in list.iter().enumerate() {
            info!("#{} {} - {} points, {} hits", rank + 1, record.name, record.score, record.hits);
        }
    }
    session.dispose();
}
