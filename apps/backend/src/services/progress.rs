//! Cumulative grammar progress.

use chrono::NaiveDate;
use nihongo_core::grammar::AnalysisResult;
use std::collections::BTreeMap;

use crate::models::{MasteryEntry, UserProgress};

impl UserProgress {
    /// Fold one analysis into the running totals.
    ///
    /// Every recorded usage counts as a correct use; issues only lower the
    /// per-check score.
    pub fn record_analysis(&mut self, analysis: &AnalysisResult, today: NaiveDate) {
        self.total_checks += 1;

        let used = analysis.particle_usage.len() + analysis.verb_conjugations.len();
        let score = used.saturating_sub(analysis.grammar_issues.len());
        self.total_correct += u32::try_from(score).unwrap_or(u32::MAX);

        tally(
            &mut self.particle_mastery,
            analysis.particle_usage.iter().map(|p| p.particle.as_str()),
        );
        tally(
            &mut self.verb_mastery,
            analysis.verb_conjugations.iter().map(|v| v.conjugation.as_str()),
        );
        tally(
            &mut self.pattern_mastery,
            analysis.advanced_patterns.iter().map(|p| p.pattern.as_str()),
        );

        self.update_streak(today);
        self.average_accuracy = f64::from(self.total_correct) / f64::from(self.total_checks);
    }

    fn update_streak(&mut self, today: NaiveDate) {
        match self.last_check_date {
            None => {
                self.current_streak = 1;
                self.longest_streak = self.longest_streak.max(1);
            }
            Some(last) if last == today => {}
            Some(last) if (today - last).num_days() == 1 => {
                self.current_streak += 1;
                self.longest_streak = self.longest_streak.max(self.current_streak);
            }
            Some(_) => self.current_streak = 1,
        }
        self.last_check_date = Some(today);
    }
}

fn tally<'a>(mastery: &mut BTreeMap<String, MasteryEntry>, names: impl Iterator<Item = &'a str>) {
    for name in names {
        let entry = mastery.entry(name.to_string()).or_default();
        entry.count += 1;
        entry.correct += 1;
    }
}
