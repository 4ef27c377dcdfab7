//! Spaced repetition algorithm implementations.

pub mod sm2;

use chrono::NaiveDate;

/// Result of scheduling an item after review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulingResult {
    pub ease_factor: f64,
    pub interval: u32,
    pub next_review: NaiveDate,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next schedule from the state in effect before a review.
    ///
    /// `quality` is expected in `0..=5`; callers validate it.
    fn schedule(
        &self,
        ease_factor: f64,
        interval: u32,
        quality: u8,
        today: NaiveDate,
    ) -> SchedulingResult;

    /// Ease factor given to a new item.
    fn initial_ease(&self) -> f64;
}

