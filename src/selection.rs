// src/selection.rs

use crate::constants::*;
use crate::models::CompetencyEntry;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Uniform shuffle over the whole table to gather a baseline.
    ColdStart,
    /// Confidence-weighted sampling.
    Adaptive,
}

impl SelectionPhase {
    /// `session_ordinal` is the 1-based play count, already incremented for this session.
    pub fn for_session(session_ordinal: u32, early_session_threshold: u32) -> Self {
        if session_ordinal <= early_session_threshold {
            SelectionPhase::ColdStart
        } else {
            SelectionPhase::Adaptive
        }
    }
}

/// Picks the facts for one session. Never repeats a fact and returns
/// `min(session_length, table.len())` entries.
pub fn select_puzzles<R: Rng>(
    table: &[CompetencyEntry],
    session_ordinal: u32,
    early_session_threshold: u32,
    session_length: usize,
    rng: &mut R,
) -> Vec<CompetencyEntry> {
    let phase = SelectionPhase::for_session(session_ordinal, early_session_threshold);
    info!(
        "[Select] Session {} using {:?} phase ({} candidates)",
        session_ordinal,
        phase,
        table.len()
    );

    match phase {
        SelectionPhase::ColdStart => select_shuffled(table, session_length, rng),
        SelectionPhase::Adaptive => select_adaptive(table, session_length, rng),
    }
}

pub fn select_shuffled<R: Rng>(
    table: &[CompetencyEntry],
    session_length: usize,
    rng: &mut R,
) -> Vec<CompetencyEntry> {
    let mut pool: Vec<&CompetencyEntry> = table.iter().collect();
    pool.shuffle(rng);
    pool.into_iter().take(session_length).cloned().collect()
}

/// Removes and returns a uniformly random index from `pool`.
fn pull_random<R: Rng>(pool: &mut Vec<usize>, rng: &mut R) -> usize {
    let idx = rng.gen_range(0..pool.len());
    pool.swap_remove(idx)
}

/// Fills ~70% of the session from the near-mastery band, up to ~90% from the
/// weak band, and the rest uniformly from whatever has not been picked yet.
pub fn select_adaptive<R: Rng>(
    table: &[CompetencyEntry],
    session_length: usize,
    rng: &mut R,
) -> Vec<CompetencyEntry> {
    let mut near_mastery: Vec<usize> = (0..table.len())
        .filter(|&i| (NEAR_MASTERY_MIN..=NEAR_MASTERY_MAX).contains(&table[i].confidence))
        .collect();
    near_mastery.sort_by_key(|&i| table[i].confidence);

    let mut weak: Vec<usize> = (0..table.len())
        .filter(|&i| table[i].confidence > WEAK_FLOOR)
        .collect();
    weak.sort_by_key(|&i| std::cmp::Reverse(table[i].confidence));

    debug!(
        "[Select] Bands: near-mastery={}, weak={}",
        near_mastery.len(),
        weak.len()
    );

    let near_quota = session_length as f64 * NEAR_MASTERY_SHARE;
    let weak_quota = session_length as f64 * WEAK_SHARE;

    let mut taken = vec![false; table.len()];
    let mut selected: Vec<usize> = Vec::with_capacity(session_length.min(table.len()));
    // Built on first use. Once the bands stop qualifying they never qualify again,
    // so the pool only has to exclude what was picked before it existed.
    let mut remainder: Option<Vec<usize>> = None;

    while selected.len() < session_length {
        let filled = selected.len() as f64;

        let pick = if filled < near_quota && !near_mastery.is_empty() {
            pull_random(&mut near_mastery, rng)
        } else if filled < weak_quota && !weak.is_empty() {
            pull_random(&mut weak, rng)
        } else {
            let pool = remainder
                .get_or_insert_with(|| (0..table.len()).filter(|&i| !taken[i]).collect());
            if pool.is_empty() {
                break;
            }
            pull_random(pool, rng)
        };

        taken[pick] = true;
        selected.push(pick);
    }

    selected.into_iter().map(|i| table[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn table(confidences: &[i32]) -> Vec<CompetencyEntry> {
        confidences
            .iter()
            .enumerate()
            .map(|(i, c)| CompetencyEntry::new(Fact::new(i as u8 + 2, 3), *c, *c))
            .collect()
    }

    fn is_near(e: &CompetencyEntry) -> bool {
        (NEAR_MASTERY_MIN..=NEAR_MASTERY_MAX).contains(&e.confidence)
    }

    #[test]
    fn test_phase_switch() {
        assert_eq!(SelectionPhase::for_session(1, 3), SelectionPhase::ColdStart);
        assert_eq!(SelectionPhase::for_session(3, 3), SelectionPhase::ColdStart);
        assert_eq!(SelectionPhase::for_session(4, 3), SelectionPhase::Adaptive);
    }

    #[test]
    fn test_small_table_returns_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let t = table(&[10, 50, 20]);
        for ordinal in [1, 10] {
            let picked = select_puzzles(&t, ordinal, 3, 10, &mut rng);
            assert_eq!(picked.len(), 3);
            let facts: HashSet<_> = picked.iter().map(|e| e.fact).collect();
            assert_eq!(facts.len(), 3);
        }
    }

    #[test]
    fn test_empty_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(select_adaptive(&[], 10, &mut rng).is_empty());
        assert!(select_shuffled(&[], 10, &mut rng).is_empty());
    }

    #[test]
    fn test_near_mastery_fills_first() {
        // 5 near-mastery, 2 weak, 3 middle
        let t = table(&[6, 8, 10, 12, 15, 40, 90, 20, 25, 30]);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let picked = select_adaptive(&t, 5, &mut rng);
            assert_eq!(picked.len(), 5);
            // 5 * 0.7 = 3.5 -> four near-mastery picks, then one weak
            assert!(picked[..4].iter().all(is_near));
            assert!(picked[4].confidence > WEAK_FLOOR);
        }
    }

    #[test]
    fn test_middle_band_only_after_bands() {
        let t = table(&[7, 9, 35, 18, 22, 27, 29, 16, 19, 21, 23, 24]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picked = select_adaptive(&t, 10, &mut rng);
        assert_eq!(picked.len(), 10);
        assert!(is_near(&picked[0]) && is_near(&picked[1]));
        assert_eq!(picked[2].confidence, 35);
        assert!(picked[3..]
            .iter()
            .all(|e| e.confidence > NEAR_MASTERY_MAX && e.confidence <= WEAK_FLOOR));
    }

    #[test]
    fn test_leftover_band_members_reach_remainder() {
        // Eight near-mastery facts, quota stops at seven; the eighth may still fill the tail.
        let t = table(&[6, 7, 8, 9, 10, 11, 12, 13]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let picked = select_adaptive(&t, 10, &mut rng);
        assert_eq!(picked.len(), 8);
    }

    #[test]
    fn test_shuffle_covers_whole_table() {
        let t = table(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for e in select_puzzles(&t, 2, 3, 3, &mut rng) {
                seen.insert(e.fact);
            }
        }
        assert_eq!(seen.len(), t.len());
    }
}
