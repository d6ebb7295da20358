// src/models.rs

use crate::constants::HISTORY_CAPACITY;
use crate::error::TrainerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Facts ---

/// A single ordered multiplication pair. `7 x 8` and `8 x 7` are distinct facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fact {
    pub left: u8,
    pub right: u8,
}

impl Fact {
    pub fn new(left: u8, right: u8) -> Self {
        Fact { left, right }
    }

    pub fn answer(&self) -> u32 {
        self.left as u32 * self.right as u32
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.left, self.right)
    }
}

impl FromStr for Fact {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrainerError::InvalidFact(s.to_string());
        let (left, right) = s.trim().split_once(" x ").ok_or_else(invalid)?;
        let left = left.trim().parse::<u8>().map_err(|_| invalid())?;
        let right = right.trim().parse::<u8>().map_err(|_| invalid())?;
        Ok(Fact { left, right })
    }
}

impl TryFrom<String> for Fact {
    type Error = TrainerError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fact> for String {
    fn from(fact: Fact) -> Self {
        fact.to_string()
    }
}

// --- Competency Table ---

/// One row of a learner's competency table.
///
/// Field names on the wire follow the legacy save format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyEntry {
    #[serde(rename = "puzzle")]
    pub fact: Fact,
    /// Static seed difficulty. Never changed by play.
    #[serde(rename = "rating")]
    pub base_difficulty: i32,
    /// 1..=100, lower is better mastered.
    #[serde(rename = "userRating")]
    pub confidence: i32,
}

impl CompetencyEntry {
    pub fn new(fact: Fact, base_difficulty: i32, confidence: i32) -> Self {
        CompetencyEntry {
            fact,
            base_difficulty,
            confidence,
        }
    }
}

// --- Answer History ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerHistoryEntry {
    #[serde(rename = "puzzle")]
    pub fact: Fact,
    #[serde(rename = "time")]
    pub response_time: f64,
    pub correct: bool,
}

/// Append-only answer log that keeps only the newest `HISTORY_CAPACITY` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerHistory {
    entries: Vec<AnswerHistoryEntry>,
}

impl AnswerHistory {
    pub fn new() -> Self {
        AnswerHistory::default()
    }

    /// Builds a history from stored entries, dropping the oldest beyond capacity.
    pub fn from_entries(mut entries: Vec<AnswerHistoryEntry>) -> Self {
        if entries.len() > HISTORY_CAPACITY {
            let excess = entries.len() - HISTORY_CAPACITY;
            entries.drain(..excess);
        }
        AnswerHistory { entries }
    }

    pub fn push(&mut self, entry: AnswerHistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.remove(0);
        }
    }

    pub fn as_slice(&self) -> &[AnswerHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// --- Feedback ---

/// Response speed bracket for a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Instant,
    VeryFast,
    Fast,
    Medium,
    Slow,
}

impl PerformanceTier {
    pub fn color(&self) -> &'static str {
        match self {
            PerformanceTier::Instant => "green",
            PerformanceTier::VeryFast => "lime",
            PerformanceTier::Fast => "yellow",
            PerformanceTier::Medium => "orange",
            PerformanceTier::Slow => "red",
        }
    }
}

// --- Aggregates ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteryStats {
    /// 0..=100, or NaN when the table has no valid rows.
    pub mastery_score: f64,
    pub avg_response_time: f64,
    pub recent_accuracy: f64,
    pub puzzles_at_mastery: usize,
    pub total_puzzles: usize,
}

impl MasteryStats {
    /// The score as shown to players: an empty table reads as 0.
    pub fn display_score(&self) -> f64 {
        if self.mastery_score.is_nan() {
            0.0
        } else {
            self.mastery_score
        }
    }
}

/// Everything a finished (or abandoned) session hands to the summary screen.
/// All four sequences are index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub deltas: Vec<i32>,
    pub presented_facts: Vec<CompetencyEntry>,
    pub response_times: Vec<f64>,
    pub correctness: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    Improvement(i32),
    Degradation(i32),
    NoChange,
}

impl SessionSummary {
    pub fn net_change(&self) -> i32 {
        self.deltas.iter().sum()
    }

    // Negative net change means confidence values dropped, i.e. the learner improved.
    pub fn verdict(&self) -> SessionVerdict {
        let net = self.net_change();
        if net < 0 {
            SessionVerdict::Improvement(-net)
        } else if net > 0 {
            SessionVerdict::Degradation(net)
        } else {
            SessionVerdict::NoChange
        }
    }

    pub fn correct_count(&self) -> usize {
        self.correctness.iter().filter(|c| **c).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStanding {
    pub player: String,
    pub current_mastery: f64,
    pub highest_mastery: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(left: u8, right: u8) -> AnswerHistoryEntry {
        AnswerHistoryEntry {
            fact: Fact::new(left, right),
            response_time: 1.0,
            correct: true,
        }
    }

    #[test]
    fn test_fact_parses_canonical_form() {
        let fact: Fact = "7 x 8".parse().unwrap();
        assert_eq!(fact, Fact::new(7, 8));
        assert_eq!(fact.answer(), 56);
        assert_eq!(fact.to_string(), "7 x 8");
    }

    #[test]
    fn test_fact_rejects_garbage() {
        assert!("7x8".parse::<Fact>().is_err());
        assert!("seven x 8".parse::<Fact>().is_err());
        assert!("".parse::<Fact>().is_err());
    }

    #[test]
    fn test_symmetric_facts_are_distinct() {
        assert_ne!(Fact::new(7, 8), Fact::new(8, 7));
    }

    #[test]
    fn test_entry_uses_legacy_field_names() {
        let e = CompetencyEntry::new(Fact::new(2, 3), 5, 4);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"puzzle":"2 x 3","rating":5,"userRating":4}"#);
        let back: CompetencyEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = AnswerHistory::new();
        for i in 0..(HISTORY_CAPACITY as u8 + 1) {
            history.push(entry(i, 1));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.as_slice()[0].fact, Fact::new(1, 1));
        assert_eq!(history.as_slice()[HISTORY_CAPACITY - 1].fact, Fact::new(50, 1));
    }

    #[test]
    fn test_history_from_oversized_entries_keeps_newest() {
        let entries: Vec<_> = (0..60u8).map(|i| entry(i, 2)).collect();
        let history = AnswerHistory::from_entries(entries);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.as_slice()[0].fact, Fact::new(10, 2));
    }

    #[test]
    fn test_display_score_hides_nan() {
        let mut stats = MasteryStats {
            mastery_score: f64::NAN,
            avg_response_time: 0.0,
            recent_accuracy: 0.0,
            puzzles_at_mastery: 0,
            total_puzzles: 0,
        };
        assert_eq!(stats.display_score(), 0.0);
        stats.mastery_score = 42.0;
        assert_eq!(stats.display_score(), 42.0);
    }

    #[test]
    fn test_verdict_from_net_change() {
        let mut summary = SessionSummary::default();
        assert_eq!(summary.verdict(), SessionVerdict::NoChange);
        summary.deltas = vec![-8, -6, 12];
        assert_eq!(summary.verdict(), SessionVerdict::Improvement(2));
        summary.deltas = vec![8];
        assert_eq!(summary.verdict(), SessionVerdict::Degradation(8));
    }
}
