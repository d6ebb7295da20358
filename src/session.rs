// src/session.rs

use crate::constants::TIMEOUT_TIME;
use crate::error::{Result, TrainerError};
use crate::models::{AnswerHistory, AnswerHistoryEntry, CompetencyEntry, SessionSummary};
use crate::rating::{self, RatingUpdate};
use crate::selection;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of one drill session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    pub session_length: usize,
    pub early_session_threshold: u32,
    /// Wrong answers allowed before the session ends early. `None` disables lives.
    pub lives: Option<u32>,
}

impl Default for SessionRules {
    fn default() -> Self {
        SessionRules {
            session_length: crate::constants::GAME_LENGTH,
            early_session_threshold: crate::constants::EARLY_SESSION_THRESHOLD,
            lives: None,
        }
    }
}

/// Drives one session: the selected facts, a cursor, and index-aligned outcomes.
///
/// Calling operations out of order is a programmer error and panics.
#[derive(Debug, Clone)]
pub struct SessionController {
    selected: Vec<CompetencyEntry>,
    current_index: usize,
    answered_current: bool,
    lives_left: Option<u32>,
    deltas: Vec<i32>,
    response_times: Vec<f64>,
    correctness: Vec<bool>,
}

impl SessionController {
    /// Selects the session's facts and starts with empty outcomes.
    pub fn start<R: Rng>(
        table: &[CompetencyEntry],
        session_ordinal: u32,
        rules: &SessionRules,
        rng: &mut R,
    ) -> Self {
        let selected = selection::select_puzzles(
            table,
            session_ordinal,
            rules.early_session_threshold,
            rules.session_length,
            rng,
        );
        info!("[Session] Started session {} with {} facts", session_ordinal, selected.len());
        SessionController::with_facts(selected, rules.lives)
    }

    pub fn with_facts(selected: Vec<CompetencyEntry>, lives: Option<u32>) -> Self {
        SessionController {
            current_index: 0,
            answered_current: false,
            lives_left: lives,
            deltas: Vec::with_capacity(selected.len()),
            response_times: Vec::with_capacity(selected.len()),
            correctness: Vec::with_capacity(selected.len()),
            selected,
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn lives_left(&self) -> Option<u32> {
        self.lives_left
    }

    /// 1-based position of the current fact and the session length.
    pub fn progress(&self) -> (usize, usize) {
        ((self.current_index + 1).min(self.selected.len()), self.selected.len())
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives_left == Some(0)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.selected.len() || self.is_out_of_lives()
    }

    /// The fact being drilled, as it was when selected.
    pub fn current_fact(&self) -> &CompetencyEntry {
        assert!(!self.is_complete(), "current_fact called on a completed session");
        &self.selected[self.current_index]
    }

    /// Scores the current fact against the live table and logs the answer.
    ///
    /// The caller persists `table` and `history` afterwards.
    pub fn submit(
        &mut self,
        table: &mut [CompetencyEntry],
        history: &mut AnswerHistory,
        is_correct: bool,
        response_time: f64,
    ) -> Result<RatingUpdate> {
        assert!(!self.is_complete(), "submit called on a completed session");
        assert!(
            !self.answered_current,
            "submit called twice for fact #{} without advance",
            self.current_index
        );
        assert!(
            response_time.is_finite() && response_time >= 0.0,
            "response time must be a non-negative number of seconds, got {}",
            response_time
        );

        let fact = self.selected[self.current_index].fact;
        let entry = table
            .iter_mut()
            .find(|e| e.fact == fact)
            .ok_or_else(|| TrainerError::UnknownFact(fact.to_string()))?;

        let update = rating::update(entry, is_correct, response_time);
        entry.confidence = update.new_confidence;

        self.deltas.push(update.applied_delta);
        self.response_times.push(response_time);
        self.correctness.push(is_correct);
        self.answered_current = true;

        history.push(AnswerHistoryEntry {
            fact,
            response_time,
            correct: is_correct,
        });

        if !is_correct {
            if let Some(lives) = self.lives_left.as_mut() {
                *lives = lives.saturating_sub(1);
                debug!("[Session] Life lost on {}, {} left", fact, lives);
            }
        }

        Ok(update)
    }

    pub fn submit_timeout(
        &mut self,
        table: &mut [CompetencyEntry],
        history: &mut AnswerHistory,
    ) -> Result<RatingUpdate> {
        self.submit(table, history, false, TIMEOUT_TIME)
    }

    /// Moves past the answered fact. Returns whether another fact is available.
    pub fn advance(&mut self) -> bool {
        assert!(
            self.current_index < self.selected.len(),
            "advance called on a completed session"
        );
        assert!(
            self.answered_current,
            "advance called before fact #{} was answered",
            self.current_index
        );
        self.current_index += 1;
        self.answered_current = false;
        !self.is_complete()
    }

    /// Outcomes so far, with the facts presented up to the cursor.
    pub fn summary(&self) -> SessionSummary {
        let presented = self.deltas.len();
        SessionSummary {
            deltas: self.deltas.clone(),
            presented_facts: self.selected[..presented].to_vec(),
            response_times: self.response_times.clone(),
            correctness: self.correctness.clone(),
        }
    }
}
