// src/rating.rs

use crate::constants::*;
use crate::models::{CompetencyEntry, PerformanceTier};
use log::debug;

/// Result of applying one answer to a fact's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingUpdate {
    pub old_confidence: i32,
    pub new_confidence: i32,
    /// Delta chosen by the schedule, before clamping. This is what feedback shows.
    pub nominal_delta: i32,
    /// `new_confidence - old_confidence`. This is what gets recorded.
    pub applied_delta: i32,
}

fn threshold_for(response_time: f64) -> &'static TimeThreshold {
    TIME_THRESHOLDS
        .iter()
        .find(|t| response_time <= t.max_time)
        .unwrap_or(&TIME_THRESHOLDS[TIME_THRESHOLDS.len() - 1])
}

/// Reward for a correct answer; faster answers lower confidence further.
pub fn correct_delta(response_time: f64) -> i32 {
    threshold_for(response_time).delta
}

/// Penalty for a wrong answer or timeout, keyed on the confidence before the answer.
pub fn incorrect_delta(confidence: i32) -> i32 {
    if confidence <= CONFIDENT_PENALTY_CEILING {
        PENALTY_CONFIDENT
    } else {
        PENALTY_WEAK
    }
}

pub fn performance_tier(response_time: f64) -> PerformanceTier {
    threshold_for(response_time).tier
}

pub fn clamp_confidence(value: i32) -> i32 {
    value.clamp(MIN_RATING, MAX_RATING)
}

/// Computes the new confidence for `entry`. Pure; the caller writes it back.
pub fn update(entry: &CompetencyEntry, is_correct: bool, response_time: f64) -> RatingUpdate {
    let old_confidence = entry.confidence;
    let nominal_delta = if is_correct {
        correct_delta(response_time)
    } else {
        incorrect_delta(old_confidence)
    };
    let new_confidence = clamp_confidence(old_confidence.saturating_add(nominal_delta));

    debug!(
        "[Rating] {}: correct={} time={:.2}s {} -> {} (nominal {:+})",
        entry.fact, is_correct, response_time, old_confidence, new_confidence, nominal_delta
    );

    RatingUpdate {
        old_confidence,
        new_confidence,
        nominal_delta,
        applied_delta: new_confidence - old_confidence,
    }
}

/// A timeout is scored as a wrong answer at the sentinel time.
pub fn update_timeout(entry: &CompetencyEntry) -> RatingUpdate {
    update(entry, false, TIMEOUT_TIME)
}
