//! Forecast and statistics over a collection.

use super::store::Collection;
use crate::algorithm::sm2::PASSING_QUALITY;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of the trailing daily review series.
pub const DAILY_SERIES_DAYS: i64 = 30;

/// Longest forecast horizon, in days.
pub const MAX_FORECAST_DAYS: u32 = 365;

/// Number of items scheduled on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Aggregate figures for a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_items: usize,
    pub items_by_type: BTreeMap<String, usize>,
    pub total_reviews: u32,
    pub average_ease: f64,
    pub review_success_rate: f64,
    pub daily_reviews: Vec<DayCount>,
}

/// Per-day counts for `[today, today + days)`, with `days` capped at
/// [`MAX_FORECAST_DAYS`].
///
/// An item counts only on the exact date of its `next_review`; overdue items
/// are not folded into today.
pub fn review_forecast(items: &Collection, today: NaiveDate, days: u32) -> Vec<DayCount> {
    let days = days.min(MAX_FORECAST_DAYS);
    let mut counts = vec![0usize; days as usize];
    for item in items.values() {
        let offset = (item.next_review - today).num_days();
        if (0..i64::from(days)).contains(&offset) {
            counts[offset as usize] += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(offset, count)| DayCount {
            date: today + Duration::days(offset as i64),
            count,
        })
        .collect()
}

pub fn statistics(items: &Collection, today: NaiveDate) -> Statistics {
    if items.is_empty() {
        return Statistics {
            total_items: 0,
            items_by_type: BTreeMap::new(),
            total_reviews: 0,
            average_ease: 0.0,
            review_success_rate: 0.0,
            daily_reviews: Vec::new(),
        };
    }

    let mut items_by_type = BTreeMap::new();
    for item in items.values() {
        *items_by_type
            .entry(item.item_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total_reviews = items.values().map(|i| i.review_count).sum();
    let average_ease = items.values().map(|i| i.ease_factor).sum::<f64>() / items.len() as f64;

    let records = items.values().flat_map(|i| i.history.iter());
    let (attempts, successes) = records.fold((0usize, 0usize), |(n, ok), r| {
        (n + 1, ok + usize::from(r.quality >= PASSING_QUALITY))
    });
    let review_success_rate = if attempts > 0 {
        successes as f64 / attempts as f64
    } else {
        0.0
    };

    // Newest first; each item counts once per day however often it was reviewed.
    let daily_reviews = (0..DAILY_SERIES_DAYS)
        .map(|back| {
            let date = today - Duration::days(back);
            let count = items
                .values()
                .filter(|i| i.history.iter().any(|r| r.date == date))
                .count();
            DayCount { date, count }
        })
        .collect();

    Statistics {
        total_items: items.len(),
        items_by_type,
        total_reviews,
        average_ease,
        review_success_rate,
        daily_reviews,
    }
}
