//! Local Leaderboards
//!
//! Top-10 lists kept as one JSON array per game under a fixed key. The
//! stored layout matches what the browser pages write:
//!
//! ```text
//! animal_match_leaderboard_v1: [{"name": "..", "moves": 14, "time": "01:23", "date": "2025-..Z"}]
//! shooter_leaderboard_v1:      [{"name": "..", "score": 61, "hits": 12, "date": "2025-..Z"}]
//! ```
//!
//! Storage problems never reach the player: an unreadable list reads as
//! empty, a malformed row is dropped and a failed write is skipped, all with
//! a warning in the log.

use std::cmp::Ordering;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::storage::Storage;

/// Entries kept per leaderboard.
pub const MAX_ENTRIES: usize = 10;

/// Name stored when the player leaves the field blank.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Storage key for the Match leaderboard.
pub const MATCH_LEADERBOARD_KEY: &str = "animal_match_leaderboard_v1";

/// Storage key for the Shooter leaderboard.
pub const SHOOTER_LEADERBOARD_KEY: &str = "shooter_leaderboard_v1";

/// Trimmed player name, or the placeholder if nothing is left.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// A leaderboard row with its game's ranking rule.
pub trait RankedRecord: Clone + Serialize + DeserializeOwned {
    /// Storage key for this game's list.
    const STORAGE_KEY: &'static str;

    /// `Less` means `self` ranks above `other`.
    fn rank(&self, other: &Self) -> Ordering;
}

// =============================================================================
// RECORDS
// =============================================================================

/// Finished Match round. Fewer moves wins, then less time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Player name
    pub name: String,
    /// Pair attempts taken
    pub moves: u32,
    /// Elapsed seconds, stored as `mm:ss`
    #[serde(with = "clock_text")]
    pub time: u32,
    /// When the score was saved
    pub date: DateTime<Utc>,
}

impl MatchRecord {
    /// Record a round finished now.
    pub fn new(name: &str, moves: u32, time: u32) -> Self {
        Self {
            name: normalize_name(name),
            moves,
            time,
            date: Utc::now(),
        }
    }
}

impl RankedRecord for MatchRecord {
    const STORAGE_KEY: &'static str = MATCH_LEADERBOARD_KEY;

    fn rank(&self, other: &Self) -> Ordering {
        self.moves
            .cmp(&other.moves)
            .then(self.time.cmp(&other.time))
    }
}

/// Finished Shooter round. Higher score wins, then more hits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShooterRecord {
    /// Player name
    pub name: String,
    /// Points scored
    pub score: u32,
    /// Targets hit
    pub hits: u32,
    /// When the score was saved
    pub date: DateTime<Utc>,
}

impl ShooterRecord {
    /// Record a round finished now.
    pub fn new(name: &str, score: u32, hits: u32) -> Self {
        Self {
            name: normalize_name(name),
            score,
            hits,
            date: Utc::now(),
        }
    }
}

impl RankedRecord for ShooterRecord {
    const STORAGE_KEY: &'static str = SHOOTER_LEADERBOARD_KEY;

    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(other.hits.cmp(&self.hits))
    }
}

/// `mm:ss` on the wire, seconds in memory. Plain numbers are accepted too.
mod clock_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::core::clock::{format_clock, parse_clock};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(u32),
    }

    pub fn serialize<S: Serializer>(secs: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_clock(*secs))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(secs),
            Raw::Text(text) => parse_clock(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid mm:ss time {:?}", text))),
        }
    }
}

// =============================================================================
// LEADERBOARD
// =============================================================================

/// One game's leaderboard over a storage backend.
#[derive(Debug)]
pub struct Leaderboard<R, S> {
    storage: S,
    _record: PhantomData<R>,
}

impl<R: RankedRecord, S: Storage> Leaderboard<R, S> {
    /// Wrap a storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Current list, best first. Empty when nothing is stored or the stored
    /// value is not a JSON array; malformed rows inside an array are skipped.
    pub fn entries(&self) -> Vec<R> {
        let raw = match self.storage.get(R::STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Leaderboard {} unreadable, showing none: {}", R::STORAGE_KEY, e);
                return Vec::new();
            }
        };

        let rows = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Leaderboard {} corrupt, treating as empty: {}", R::STORAGE_KEY, e);
                return Vec::new();
            }
        };

        let mut list: Vec<R> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Leaderboard {} row {} dropped: {}", R::STORAGE_KEY, index, e);
                    None
                }
            })
            .collect();

        // Hand-edited data may be out of order or too long
        rank_and_trim(&mut list);
        list
    }

    /// Add a record and return the new list, best first.
    ///
    /// If the write fails the returned list is still what would have been
    /// stored; the failure is logged and otherwise ignored.
    pub fn submit(&mut self, record: R) -> Vec<R> {
        let mut list = self.entries();
        list.push(record);
        rank_and_trim(&mut list);

        match serde_json::to_string(&list) {
            Ok(json) => {
                if let Err(e) = self.storage.set(R::STORAGE_KEY, &json) {
                    warn!("Leaderboard {} save skipped: {}", R::STORAGE_KEY, e);
                } else {
                    debug!("Leaderboard {} saved with {} entries", R::STORAGE_KEY, list.len());
                }
            }
            Err(e) => warn!("Leaderboard {} not serializable: {}", R::STORAGE_KEY, e),
        }

        list
    }

    /// Forget every record. Safe to call on an empty board.
    pub fn clear(&mut self) {
        if let Err(e) = self.storage.remove(R::STORAGE_KEY) {
            warn!("Leaderboard {} clear failed: {}", R::STORAGE_KEY, e);
        }
    }

    /// Backend access.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Stable sort by the ranking rule, then keep the top entries.
fn rank_and_trim<R: RankedRecord>(list: &mut Vec<R>) {
    list.sort_by(|a, b| a.rank(b));
    list.truncate(MAX_ENTRIES);
}
