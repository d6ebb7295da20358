//! Adaptive multiplication fact drill engine.
//!
//! Picks the facts to practise, updates a per-fact confidence after each
//! answer and summarises overall mastery.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod mastery;
pub mod models;
pub mod pedagogy;
pub mod rating;
pub mod repository;
pub mod selection;
pub mod session;

pub use config::TrainerConfig;
pub use error::{Result, TrainerError};
pub use models::{
    AnswerHistory, AnswerHistoryEntry, CompetencyEntry, Fact, MasteryStats, SessionSummary,
};
pub use pedagogy::{SessionReport, Trainer};
pub use repository::{CompetencyStore, MemoryStore, SqliteStore};
pub use session::{SessionController, SessionRules};
