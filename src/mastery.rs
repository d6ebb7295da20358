// src/mastery.rs

use crate::constants::*;
use crate::models::{AnswerHistoryEntry, CompetencyEntry, MasteryStats};
use log::debug;

/// Folds the competency table and recent answers into one 0..=100 score.
///
/// Degenerate inputs never fail: an empty history contributes zero speed and
/// zero accuracy, while a table without valid rows yields a NaN score that the
/// caller is expected to handle.
pub fn calculate_mastery(
    table: &[CompetencyEntry],
    history: &[AnswerHistoryEntry],
) -> MasteryStats {
    let valid: Vec<&CompetencyEntry> =
        table.iter().filter(|e| e.confidence >= MIN_RATING).collect();
    let total_puzzles = valid.len();

    // 1. Confidence: rating 1 maps to 100, rating 100 maps to 1. NaN on an empty table.
    let confidence_score =
        valid.iter().map(|e| (101 - e.confidence) as f64).sum::<f64>() / total_puzzles as f64;

    // 2. Speed & accuracy over the recent window
    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let (recent_accuracy, avg_response_time) = if recent.is_empty() {
        (0.0, 0.0)
    } else {
        let n = recent.len() as f64;
        let correct = recent.iter().filter(|h| h.correct).count() as f64;
        let time = recent.iter().map(|h| h.response_time).sum::<f64>();
        (correct / n, time / n)
    };

    let speed_bonus = if avg_response_time > 0.0 {
        (100.0 - (avg_response_time / MASTERY_THRESHOLD_FAST) * 50.0).max(0.0)
    } else {
        0.0
    };
    let accuracy_bonus = recent_accuracy * 100.0;

    // f64::clamp keeps NaN as NaN.
    let mastery_score = (confidence_score * CONFIDENCE_WEIGHT
        + speed_bonus * SPEED_WEIGHT
        + accuracy_bonus * ACCURACY_WEIGHT)
        .round()
        .clamp(0.0, 100.0);

    let puzzles_at_mastery = valid.iter().filter(|e| e.confidence <= MASTERED_CONFIDENCE).count();

    debug!(
        "[Mastery] score={} confidence={:.2} speed={:.2} accuracy={:.2} mastered={}/{}",
        mastery_score,
        confidence_score,
        speed_bonus,
        accuracy_bonus,
        puzzles_at_mastery,
        total_puzzles
    );

    MasteryStats {
        mastery_score,
        avg_response_time,
        recent_accuracy,
        puzzles_at_mastery,
        total_puzzles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;

    fn table(confidences: &[i32]) -> Vec<CompetencyEntry> {
        confidences
            .iter()
            .enumerate()
            .map(|(i, c)| CompetencyEntry::new(Fact::new(2, i as u8 + 2), 1, *c))
            .collect()
    }

    fn answers(n: usize, time: f64, correct: bool) -> Vec<AnswerHistoryEntry> {
        (0..n)
            .map(|_| AnswerHistoryEntry {
                fact: Fact::new(3, 4),
                response_time: time,
                correct,
            })
            .collect()
    }

    #[test]
    fn test_empty_table_is_nan() {
        let stats = calculate_mastery(&[], &[]);
        assert_eq!(stats.total_puzzles, 0);
        assert_eq!(stats.puzzles_at_mastery, 0);
        assert_eq!(stats.avg_response_time, 0.0);
        assert_eq!(stats.recent_accuracy, 0.0);
        assert!(stats.mastery_score.is_nan());
    }

    #[test]
    fn test_confident_table_without_history() {
        // Empty history contributes no speed and no accuracy.
        let stats = calculate_mastery(&table(&[1, 1]), &[]);
        assert_eq!(stats.mastery_score, 50.0);
        assert_eq!(stats.puzzles_at_mastery, 2);
        assert_eq!(stats.total_puzzles, 2);
        assert_eq!(stats.avg_response_time, 0.0);
        assert_eq!(stats.recent_accuracy, 0.0);
    }

    #[test]
    fn test_fast_threshold_answers() {
        let stats = calculate_mastery(&table(&[1, 1]), &answers(2, MASTERY_THRESHOLD_FAST, true));
        // 100*0.5 + 50*0.25 + 100*0.25 = 87.5
        assert_eq!(stats.mastery_score, 88.0);
        assert_eq!(stats.avg_response_time, MASTERY_THRESHOLD_FAST);
        assert_eq!(stats.recent_accuracy, 1.0);
    }

    #[test]
    fn test_poor_conditions() {
        let history = answers(2, MASTERY_THRESHOLD_FAST * 2.0, false);
        let stats = calculate_mastery(&table(&[100, 100]), &history);
        // 1*0.5 + 0 + 0 = 0.5
        assert_eq!(stats.mastery_score, 1.0);
        assert_eq!(stats.recent_accuracy, 0.0);
    }

    #[test]
    fn test_speed_bonus_floors_at_zero() {
        let slow = calculate_mastery(&table(&[1]), &answers(1, 20.0, true));
        // 50 + 0 + 25
        assert_eq!(slow.mastery_score, 75.0);
    }

    #[test]
    fn test_filters_invalid_rows() {
        let stats = calculate_mastery(&table(&[0, 1, 2, -4]), &[]);
        assert_eq!(stats.total_puzzles, 2);
        assert_eq!(stats.puzzles_at_mastery, 2);
    }

    #[test]
    fn test_mastered_count_uses_fixed_threshold() {
        let stats = calculate_mastery(&table(&[5, 6, 1, 100]), &[]);
        assert_eq!(stats.puzzles_at_mastery, 2);
    }

    #[test]
    fn test_only_last_twenty_answers_count() {
        let mut history = answers(30, 1.0, false);
        history.extend(answers(20, 3.0, true));
        let stats = calculate_mastery(&table(&[50]), &history);
        assert_eq!(stats.recent_accuracy, 1.0);
        assert_eq!(stats.avg_response_time, 3.0);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let t = table(&[3, 40, 77]);
        let h = answers(7, 2.5, true);
        let first = calculate_mastery(&t, &h);
        let second = calculate_mastery(&t, &h);
        assert_eq!(first, second);
        assert_eq!(t, table(&[3, 40, 77]));
    }
}
