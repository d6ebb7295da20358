// src/repository.rs

use crate::constants::{MAX_RATING, MIN_RATING};
use crate::database::{init_db, initial_table};
use crate::error::Result;
use crate::models::{AnswerHistory, AnswerHistoryEntry, CompetencyEntry, Fact};
use chrono::Utc;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// What a stored value holds. Values are namespaced by player and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKind {
    CompetencyTable,
    AnswerHistory,
    PlayCount,
    HighestMastery,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::CompetencyTable => "competencyTable",
            DataKind::AnswerHistory => "answerHistory",
            DataKind::PlayCount => "playCount",
            DataKind::HighestMastery => "highestMastery",
        }
    }
}

// --- Persistence Collaborator ---

/// Key-value persistence for learner progress.
///
/// Implementors only move raw strings. The provided methods own the format:
/// missing or corrupt data falls back to the seed table, an empty history or zero,
/// and rows that fail validation are dropped rather than repaired.
pub trait CompetencyStore {
    fn read(&self, player: &str, kind: DataKind) -> Result<Option<String>>;
    fn write(&mut self, player: &str, kind: DataKind, value: &str) -> Result<()>;
    /// Every player with any stored data, sorted.
    fn players(&self) -> Result<Vec<String>>;

    fn load_table(&self, player: &str) -> Result<Vec<CompetencyEntry>> {
        let Some(raw) = self.read(player, DataKind::CompetencyTable)? else {
            debug!("[Store] No table for {}, using seed table", player);
            return Ok(initial_table());
        };
        match parse_table(&raw) {
            Some(table) => Ok(table),
            None => {
                warn!("[Store] Corrupt competency table for {}, using seed table", player);
                Ok(initial_table())
            }
        }
    }

    fn save_table(&mut self, player: &str, table: &[CompetencyEntry]) -> Result<()> {
        let raw = serde_json::to_string(table)?;
        self.write(player, DataKind::CompetencyTable, &raw)
    }

    fn load_history(&self, player: &str) -> Result<AnswerHistory> {
        let Some(raw) = self.read(player, DataKind::AnswerHistory)? else {
            return Ok(AnswerHistory::new());
        };
        match parse_history(&raw) {
            Some(entries) => Ok(AnswerHistory::from_entries(entries)),
            None => {
                warn!("[Store] Corrupt answer history for {}, starting empty", player);
                Ok(AnswerHistory::new())
            }
        }
    }

    fn save_history(&mut self, player: &str, history: &AnswerHistory) -> Result<()> {
        let raw = serde_json::to_string(history.as_slice())?;
        self.write(player, DataKind::AnswerHistory, &raw)
    }

    fn load_play_count(&self, player: &str) -> Result<u32> {
        self.read_counter(player, DataKind::PlayCount)
    }

    fn save_play_count(&mut self, player: &str, count: u32) -> Result<()> {
        self.write(player, DataKind::PlayCount, &count.to_string())
    }

    fn load_highest_mastery(&self, player: &str) -> Result<u32> {
        self.read_counter(player, DataKind::HighestMastery)
    }

    fn save_highest_mastery(&mut self, player: &str, score: u32) -> Result<()> {
        self.write(player, DataKind::HighestMastery, &score.to_string())
    }

    fn read_counter(&self, player: &str, kind: DataKind) -> Result<u32> {
        let raw = self.read(player, kind)?;
        Ok(raw
            .and_then(|s| {
                let parsed = s.trim().parse::<u32>().ok();
                if parsed.is_none() {
                    warn!("[Store] Unreadable {} for {}: {:?}", kind.as_str(), player, s);
                }
                parsed
            })
            .unwrap_or(0))
    }
}

// --- Row Validation ---

// Stored rows may come from older saves with missing fields.
#[derive(Deserialize)]
struct StoredCompetencyRow {
    puzzle: Option<String>,
    rating: Option<i64>,
    #[serde(rename = "userRating")]
    user_rating: Option<i64>,
}

#[derive(Deserialize)]
struct StoredHistoryRow {
    puzzle: Option<String>,
    time: Option<f64>,
    correct: Option<bool>,
}

fn in_rating_range(value: i64) -> Option<i32> {
    let value = i32::try_from(value).ok()?;
    (MIN_RATING..=MAX_RATING).contains(&value).then_some(value)
}

fn validate_competency_row(value: serde_json::Value) -> Option<CompetencyEntry> {
    let row: StoredCompetencyRow = serde_json::from_value(value).ok()?;
    let fact: Fact = row.puzzle?.parse().ok()?;
    let base_difficulty = in_rating_range(row.rating?)?;
    let confidence = in_rating_range(row.user_rating?)?;
    Some(CompetencyEntry::new(fact, base_difficulty, confidence))
}

fn validate_history_row(value: serde_json::Value) -> Option<AnswerHistoryEntry> {
    let row: StoredHistoryRow = serde_json::from_value(value).ok()?;
    let fact: Fact = row.puzzle?.parse().ok()?;
    let response_time = row.time.filter(|t| t.is_finite() && *t >= 0.0)?;
    Some(AnswerHistoryEntry {
        fact,
        response_time,
        correct: row.correct?,
    })
}

/// `None` when the payload is not a JSON array at all.
pub fn parse_table(raw: &str) -> Option<Vec<CompetencyEntry>> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    let total = rows.len();
    let table: Vec<CompetencyEntry> =
        rows.into_iter().filter_map(validate_competency_row).collect();
    if table.len() < total {
        warn!("[Store] Dropped {} invalid competency rows", total - table.len());
    }
    Some(table)
}

pub fn parse_history(raw: &str) -> Option<Vec<AnswerHistoryEntry>> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    let total = rows.len();
    let entries: Vec<AnswerHistoryEntry> =
        rows.into_iter().filter_map(validate_history_row).collect();
    if entries.len() < total {
        warn!("[Store] Dropped {} invalid history rows", total - entries.len());
    }
    Some(entries)
}

// --- SQLite Backend ---

pub fn read_value(
    conn: &Connection,
    player: &str,
    kind: DataKind,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM player_data WHERE player = ? AND kind = ?",
        params![player, kind.as_str()],
        |row| row.get(0),
    )
    .optional()
}

pub fn write_value(
    conn: &Connection,
    player: &str,
    kind: DataKind,
    value: &str,
    timestamp: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO player_data (player, kind, value, updated_at) VALUES (?, ?, ?, ?)",
        params![player, kind.as_str(), value, timestamp],
    )?;
    Ok(())
}

pub fn list_players(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT player FROM player_data ORDER BY player")?;
    let players = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(players)
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(SqliteStore { conn })
    }
}

impl CompetencyStore for SqliteStore {
    fn read(&self, player: &str, kind: DataKind) -> Result<Option<String>> {
        Ok(read_value(&self.conn, player, kind)?)
    }

    fn write(&mut self, player: &str, kind: DataKind, value: &str) -> Result<()> {
        debug!("[Store] Saving {} for {}", kind.as_str(), player);
        Ok(write_value(&self.conn, player, kind, value, Utc::now().timestamp())?)
    }

    fn players(&self) -> Result<Vec<String>> {
        Ok(list_players(&self.conn)?)
    }
}

// --- In-Process Backend ---

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<(String, DataKind), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl CompetencyStore for MemoryStore {
    fn read(&self, player: &str, kind: DataKind) -> Result<Option<String>> {
        Ok(self.values.get(&(player.to_string(), kind)).cloned())
    }

    fn write(&mut self, player: &str, kind: DataKind, value: &str) -> Result<()> {
        self.values.insert((player.to_string(), kind), value.to_string());
        Ok(())
    }

    fn players(&self) -> Result<Vec<String>> {
        let names: BTreeSet<&String> = self.values.keys().map(|(player, _)| player).collect();
        Ok(names.into_iter().cloned().collect())
    }
}
