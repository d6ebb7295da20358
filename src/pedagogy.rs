// src/pedagogy.rs

use crate::database::initial_table;
use crate::error::Result;
use crate::mastery::calculate_mastery;
use crate::models::{AnswerHistory, CompetencyEntry, MasteryStats, PlayerStanding, SessionSummary};
use crate::rating::RatingUpdate;
use crate::repository::{CompetencyStore, DataKind};
use crate::session::{SessionController, SessionRules};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// What the summary screen gets once a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub player: String,
    pub summary: SessionSummary,
    pub mastery: MasteryStats,
    pub highest_mastery: u32,
    pub new_record: bool,
}

struct ActiveSession {
    player: String,
    table: Vec<CompetencyEntry>,
    history: AnswerHistory,
    controller: SessionController,
}

/// Adaptive drill engine over an injected store. One active session at a time.
pub struct Trainer<S: CompetencyStore> {
    store: S,
    rules: SessionRules,
    rng: ChaCha8Rng,
    active: Option<ActiveSession>,
}

// --- Public Interface ---

impl<S: CompetencyStore> Trainer<S> {
    pub fn new(store: S, rules: SessionRules) -> Self {
        Trainer::with_rng(store, rules, ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(store: S, rules: SessionRules, seed: u64) -> Self {
        Trainer::with_rng(store, rules, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(store: S, rules: SessionRules, rng: ChaCha8Rng) -> Self {
        Trainer {
            store,
            rules,
            rng,
            active: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    /// Loads the player's progress, bumps the play count and selects the facts.
    /// Replaces any session in progress. Returns the number of facts selected.
    pub fn start_session(&mut self, player: &str) -> Result<usize> {
        let table = self.store.load_table(player)?;
        let history = self.store.load_history(player)?;
        let play_count = self.store.load_play_count(player)?.saturating_add(1);
        self.store.save_play_count(player, play_count)?;

        let controller = SessionController::start(&table, play_count, &self.rules, &mut self.rng);
        let length = controller.len();
        info!("[Session] {} started session #{} ({} facts)", player, play_count, length);

        self.active = Some(ActiveSession {
            player: player.to_string(),
            table,
            history,
            controller,
        });
        Ok(length)
    }

    pub fn has_active_session(&self) -> bool {
        self.active.is_some()
    }

    /// The fact to present, with its current confidence.
    pub fn current_fact(&self) -> CompetencyEntry {
        let session = self.active();
        let selected = session.controller.current_fact();
        session
            .table
            .iter()
            .find(|e| e.fact == selected.fact)
            .unwrap_or(selected)
            .clone()
    }

    /// Scores the current fact and persists the table and history.
    /// `applied_delta` of the result is what the session records.
    pub fn submit_answer(&mut self, is_correct: bool, response_time: f64) -> Result<RatingUpdate> {
        let session = self.active_mut();
        let update = session
            .controller
            .submit(&mut session.table, &mut session.history, is_correct, response_time)?;
        self.persist_active()?;
        Ok(update)
    }

    pub fn submit_timeout(&mut self) -> Result<RatingUpdate> {
        let session = self.active_mut();
        let update = session
            .controller
            .submit_timeout(&mut session.table, &mut session.history)?;
        self.persist_active()?;
        Ok(update)
    }

    /// Moves to the next fact. Returns whether one is available.
    pub fn advance(&mut self) -> bool {
        self.active_mut().controller.advance()
    }

    pub fn is_session_complete(&self) -> bool {
        self.active().controller.is_complete()
    }

    pub fn progress(&self) -> (usize, usize) {
        self.active().controller.progress()
    }

    pub fn lives_left(&self) -> Option<u32> {
        self.active().controller.lives_left()
    }

    pub fn session_summary(&self) -> SessionSummary {
        self.active().controller.summary()
    }

    /// Closes a completed session and records a new highest mastery if reached.
    pub fn finish_session(&mut self) -> Result<SessionReport> {
        assert!(
            self.is_session_complete(),
            "finish_session called before the session completed"
        );
        let session = match self.active.take() {
            Some(s) => s,
            None => unreachable!("checked by is_session_complete"),
        };

        let mastery = calculate_mastery(&session.table, session.history.as_slice());
        let previous = self.store.load_highest_mastery(&session.player)?;
        let mut highest_mastery = previous;
        // NaN compares false, so an empty table never sets a record.
        if mastery.mastery_score > previous as f64 {
            highest_mastery = mastery.mastery_score as u32;
            self.store.save_highest_mastery(&session.player, highest_mastery)?;
            info!(
                "[Mastery] {} new highest mastery {} (was {})",
                session.player, highest_mastery, previous
            );
        }

        Ok(SessionReport {
            player: session.player,
            summary: session.controller.summary(),
            mastery,
            highest_mastery,
            new_record: highest_mastery > previous,
        })
    }

    /// Mastery from the player's stored progress. Works with or without a session.
    pub fn mastery(&self, player: &str) -> Result<MasteryStats> {
        let table = self.store.load_table(player)?;
        let history = self.store.load_history(player)?;
        Ok(calculate_mastery(&table, history.as_slice()))
    }

    /// Every stored player, best current mastery first.
    pub fn leaderboard(&self) -> Result<Vec<PlayerStanding>> {
        let mut standings = Vec::new();
        for player in self.store.players()? {
            // Players without a saved table have not played yet.
            let has_table = self.store.read(&player, DataKind::CompetencyTable)?.is_some();
            let current_mastery = if has_table {
                self.mastery(&player)?.display_score()
            } else {
                0.0
            };
            let highest_mastery = self.store.load_highest_mastery(&player)?;
            standings.push(PlayerStanding {
                player,
                current_mastery,
                highest_mastery,
            });
        }
        standings.sort_by(|a, b| b.current_mastery.total_cmp(&a.current_mastery));
        Ok(standings)
    }

    /// Restores the seed table and a zero play count. History and records stay.
    pub fn reset_progress(&mut self, player: &str) -> Result<()> {
        if self.active.as_ref().is_some_and(|s| s.player == player) {
            self.active = None;
        }
        self.store.save_table(player, &initial_table())?;
        self.store.save_play_count(player, 0)?;
        info!("[Store] Progress reset for {}", player);
        Ok(())
    }

    // --- Internal Helpers ---

    fn active(&self) -> &ActiveSession {
        match &self.active {
            Some(session) => session,
            None => panic!("no active session; call start_session first"),
        }
    }

    fn active_mut(&mut self) -> &mut ActiveSession {
        match &mut self.active {
            Some(session) => session,
            None => panic!("no active session; call start_session first"),
        }
    }

    fn persist_active(&mut self) -> Result<()> {
        let Some(session) = &self.active else {
            return Ok(());
        };
        debug!("[Store] Persisting progress for {}", session.player);
        self.store.save_table(&session.player, &session.table)?;
        self.store.save_history(&session.player, &session.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;
    use crate::repository::MemoryStore;

    fn trainer() -> Trainer<MemoryStore> {
        Trainer::with_seed(MemoryStore::new(), SessionRules::default(), 11)
    }

    #[test]
    fn test_start_increments_play_count() {
        let mut t = trainer();
        assert_eq!(t.start_session("ada").unwrap(), 10);
        t.start_session("ada").unwrap();
        assert_eq!(t.store().load_play_count("ada").unwrap(), 2);
    }

    #[test]
    fn test_submit_persists_immediately() {
        let mut t = trainer();
        t.start_session("ada").unwrap();
        let fact = t.current_fact();
        let update = t.submit_answer(true, 1.0).unwrap();

        let stored = t.store().load_table("ada").unwrap();
        let entry = stored.iter().find(|e| e.fact == fact.fact).unwrap();
        assert_eq!(entry.confidence, update.new_confidence);
        assert_eq!(t.store().load_history("ada").unwrap().len(), 1);
    }

    #[test]
    fn test_current_fact_reflects_live_confidence() {
        let mut store = MemoryStore::new();
        store
            .save_table("ada", &[CompetencyEntry::new(Fact::new(9, 9), 15, 15)])
            .unwrap();
        let mut t = Trainer::with_seed(store, SessionRules::default(), 1);
        assert_eq!(t.start_session("ada").unwrap(), 1);
        t.submit_answer(false, 3.0).unwrap();
        assert_eq!(t.current_fact().confidence, 23);
    }

    #[test]
    #[should_panic(expected = "no active session")]
    fn test_current_fact_without_session_panics() {
        let t = trainer();
        let _ = t.current_fact();
    }

    #[test]
    fn test_zero_lives_session_starts_complete() {
        let rules = SessionRules {
            lives: Some(0),
            ..SessionRules::default()
        };
        let mut t = Trainer::with_seed(MemoryStore::new(), rules, 4);
        assert_eq!(t.start_session("ada").unwrap(), 10);
        assert!(t.is_session_complete());
        assert!(t.session_summary().presented_facts.is_empty());
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut t = trainer();
        t.start_session("ada").unwrap();
        t.submit_answer(false, 3.0).unwrap();
        t.reset_progress("ada").unwrap();
        assert!(!t.has_active_session());
        assert_eq!(t.store().load_table("ada").unwrap(), initial_table());
        assert_eq!(t.store().load_play_count("ada").unwrap(), 0);
    }
}
