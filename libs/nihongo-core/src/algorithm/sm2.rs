//! SM-2 spaced repetition algorithm.
//!
//! The ease update is the SuperMemo 2 formula
//! `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`, floored at the
//! minimum ease. Intervals bootstrap 1 → 6 days, then grow by the updated
//! ease factor. A failed recall (`q < 3`) restarts the interval at one day but
//! keeps the lowered ease factor.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{INITIAL_EASE, MINIMUM_EASE};
use chrono::{Duration, NaiveDate};

/// Lowest quality score that counts as a successful recall.
pub const PASSING_QUALITY: u8 = 3;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub first_interval: u32,
    pub second_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE,
            minimum_ease: MINIMUM_EASE,
            first_interval: 1,
            second_interval: 6,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_ease(&self) -> f64 {
        self.initial_ease
    }

    fn schedule(
        &self,
        ease_factor: f64,
        interval: u32,
        quality: u8,
        today: NaiveDate,
    ) -> SchedulingResult {
        let new_ease = self.next_ease(ease_factor, quality);
        let new_interval = self.next_interval(interval, quality, new_ease);

        SchedulingResult {
            ease_factor: new_ease,
            interval: new_interval,
            next_review: today + Duration::days(i64::from(new_interval)),
        }
    }
}

impl Sm2 {
    fn next_ease(&self, ease_factor: f64, quality: u8) -> f64 {
        let miss = 5.0 - f64::from(quality);
        (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(self.minimum_ease)
    }

    fn next_interval(&self, interval: u32, quality: u8, new_ease: f64) -> u32 {
        if quality < PASSING_QUALITY {
            return self.first_interval;
        }
        match interval {
            0 => self.first_interval,
            1 => self.second_interval,
            // Grows by the already-updated ease factor.
            n => (f64::from(n) * new_ease).ceil() as u32,
        }
    }
}
