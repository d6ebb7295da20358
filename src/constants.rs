// src/constants.rs

use crate::models::PerformanceTier;

// --- Session Shape ---
pub const GAME_LENGTH: usize = 10;
pub const EARLY_SESSION_THRESHOLD: u32 = 3; // Sessions of pure shuffling before adapting

// --- Confidence Bounds ---
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 100;

// --- Timing ---
pub const TIMEOUT_TIME: f64 = 25.0; // Seconds, recorded for unanswered facts

/// One bracket of the correct-answer reward curve.
#[derive(Debug, Clone, Copy)]
pub struct TimeThreshold {
    pub max_time: f64, // Inclusive upper bound in seconds
    pub delta: i32,    // Confidence change for a correct answer
    pub tier: PerformanceTier,
}

// Ordered by increasing time; the last row catches everything slower.
pub static TIME_THRESHOLDS: [TimeThreshold; 5] = [
    TimeThreshold { max_time: 2.0, delta: -8, tier: PerformanceTier::Instant },
    TimeThreshold { max_time: 3.0, delta: -6, tier: PerformanceTier::VeryFast },
    TimeThreshold { max_time: 5.0, delta: -4, tier: PerformanceTier::Fast },
    TimeThreshold { max_time: 10.0, delta: -2, tier: PerformanceTier::Medium },
    TimeThreshold { max_time: f64::INFINITY, delta: -1, tier: PerformanceTier::Slow },
];

// --- Incorrect Answer Penalty ---
pub const CONFIDENT_PENALTY_CEILING: i32 = 20; // Facts at or below this take the soft penalty
pub const PENALTY_CONFIDENT: i32 = 8;
pub const PENALTY_WEAK: i32 = 12;

// --- Adaptive Selection Bands ---
pub const NEAR_MASTERY_MIN: i32 = 6;
pub const NEAR_MASTERY_MAX: i32 = 15;
pub const WEAK_FLOOR: i32 = 30; // Strictly above is weak
pub const NEAR_MASTERY_SHARE: f64 = 0.7;
pub const WEAK_SHARE: f64 = 0.9; // Cumulative with the near-mastery share

// --- History ---
pub const HISTORY_CAPACITY: usize = 50;
pub const RECENT_WINDOW: usize = 20;

// --- Mastery ---
pub const MASTERY_THRESHOLD_FAST: f64 = 3.0; // Seconds for "fast"
pub const MASTERED_CONFIDENCE: i32 = 5; // At or below counts as mastered
pub const CONFIDENCE_WEIGHT: f64 = 0.5;
pub const SPEED_WEIGHT: f64 = 0.25;
pub const ACCURACY_WEIGHT: f64 = 0.25;
