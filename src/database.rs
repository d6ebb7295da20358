// src/database.rs

use crate::models::{CompetencyEntry, Fact};
use log::debug;
use rusqlite::{Connection, Result};

pub fn init_db(conn: &Connection) -> Result<()> {
    debug!("[Store] init_db: Checking database schema...");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS player_data (
            player TEXT NOT NULL,
            kind TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (player, kind)
        );
        ",
    )?;

    Ok(())
}

// (left, right, base difficulty). Starting confidence equals base difficulty.
#[rustfmt::skip]
const SEED_TABLE: [(u8, u8, i32); 121] = [
    (2, 2, 1), (2, 5, 1), (2, 10, 1), (5, 2, 1), (5, 5, 1), (5, 10, 1),
    (10, 2, 1), (10, 5, 1), (10, 10, 1), (2, 4, 3), (2, 11, 3), (4, 2, 3),
    (4, 5, 3), (4, 10, 3), (5, 4, 3), (5, 11, 3), (10, 4, 3), (10, 11, 3),
    (11, 2, 3), (11, 5, 3), (11, 10, 3), (2, 3, 5), (3, 2, 5), (3, 5, 5),
    (3, 10, 5), (4, 4, 5), (4, 11, 5), (5, 3, 5), (10, 3, 5), (11, 4, 5),
    (11, 11, 5), (2, 9, 8), (3, 4, 8), (3, 11, 8), (4, 3, 8), (5, 9, 8),
    (9, 2, 8), (9, 5, 8), (9, 10, 8), (10, 9, 8), (11, 3, 8), (2, 6, 10),
    (3, 3, 10), (4, 9, 10), (5, 6, 10), (6, 2, 10), (6, 5, 10), (6, 10, 10),
    (9, 4, 10), (9, 11, 10), (10, 6, 10), (11, 9, 10), (2, 7, 13), (3, 9, 13),
    (4, 6, 13), (5, 7, 13), (6, 4, 13), (6, 11, 13), (7, 2, 13), (7, 5, 13),
    (7, 10, 13), (9, 3, 13), (10, 7, 13), (11, 6, 13), (2, 8, 15), (3, 6, 15),
    (5, 8, 15), (6, 3, 15), (7, 11, 15), (8, 2, 15), (8, 5, 15), (8, 10, 15),
    (9, 9, 15), (10, 8, 15), (11, 7, 15), (2, 12, 18), (3, 7, 18), (5, 12, 18),
    (6, 9, 18), (7, 3, 18), (8, 11, 18), (9, 6, 18), (10, 12, 18), (11, 8, 18),
    (12, 2, 18), (12, 5, 18), (12, 10, 18), (3, 8, 20), (4, 12, 20), (6, 6, 20),
    (8, 3, 20), (12, 4, 20), (3, 12, 23), (8, 9, 23), (9, 8, 23), (12, 3, 23),
    (6, 12, 28), (12, 6, 28), (7, 12, 30), (12, 7, 30), (4, 7, 52), (7, 4, 52),
    (7, 7, 62), (4, 8, 67), (8, 4, 67), (7, 9, 70), (9, 7, 70), (6, 7, 72),
    (7, 6, 72), (9, 12, 75), (12, 9, 75), (8, 8, 80), (11, 12, 82), (12, 11, 82),
    (7, 8, 90), (8, 7, 90), (8, 12, 95), (12, 8, 95), (12, 12, 97), (6, 8, 100),
    (8, 6, 100),
];

/// Competency table for a learner with no saved progress.
pub fn initial_table() -> Vec<CompetencyEntry> {
    SEED_TABLE
        .iter()
        .map(|&(left, right, difficulty)| {
            CompetencyEntry::new(Fact::new(left, right), difficulty, difficulty)
        })
        .collect()
}
