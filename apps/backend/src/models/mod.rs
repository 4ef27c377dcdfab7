//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Re-export shared types from nihongo-core
pub use nihongo_core::grammar::{AnalysisResult, CustomRule};
pub use nihongo_core::srs::{DayCount, Statistics};
pub use nihongo_core::types::{ImportRecord, ItemType, ItemUpdate, NewItem, SrsItem};

// === Database Entity Types ===

/// Usage tally for one particle, conjugation or pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryEntry {
    pub count: u32,
    pub correct: u32,
}

/// Cumulative grammar progress of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub session_id: String,
    #[serde(default)]
    pub total_checks: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub particle_mastery: BTreeMap<String, MasteryEntry>,
    #[serde(default)]
    pub verb_mastery: BTreeMap<String, MasteryEntry>,
    #[serde(default)]
    pub pattern_mastery: BTreeMap<String, MasteryEntry>,
    #[serde(default)]
    pub average_accuracy: f64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_check_date: Option<NaiveDate>,
}

impl UserProgress {
    /// Fresh progress for a session that has never been checked.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            total_checks: 0,
            total_correct: 0,
            particle_mastery: BTreeMap::new(),
            verb_mastery: BTreeMap::new(),
            pattern_mastery: BTreeMap::new(),
            average_accuracy: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_check_date: None,
        }
    }
}

/// Stored grammar check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarCheck {
    pub id: i64,
    pub session_id: String,
    pub input_text: String,
    pub results: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

// === API Request/Response Types ===

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    pub text: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecksQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A rule left out of the checker, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRule {
    pub rule: Option<String>,
    pub message: String,
}

/// Body for creating or replacing a custom rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRuleRequest {
    pub name: String,
    pub pattern: String,
    pub check_pattern: String,
    pub correct_pattern: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub context_rules: Vec<String>,
}

impl CustomRuleRequest {
    pub fn into_rule(self, id: i64) -> CustomRule {
        CustomRule {
            id,
            name: self.name,
            pattern: self.pattern,
            check_pattern: self.check_pattern,
            correct_pattern: self.correct_pattern,
            explanation: self.explanation,
            example: self.example,
            error_description: self.error_description,
            suggestion: self.suggestion,
            context_rules: self.context_rules,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsQuery {
    #[serde(default)]
    pub item_type: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DueQuery {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub item_type: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Pipe-delimited bulk entry text.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkAddRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedResponse {
    pub added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub removed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    /// Signed so out-of-range values reach validation instead of failing to parse.
    pub quality: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub item_id: String,
    pub interval: u32,
    pub ease_factor: f64,
    pub next_review: NaiveDate,
}

/// Split a comma separated query value, dropping blanks.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags(Some("JLPT N5, food,,")),
            vec!["JLPT N5".to_string(), "food".to_string()]
        );
        assert!(split_tags(None).is_empty());
        assert!(split_tags(Some(" ")).is_empty());
    }

    #[test]
    fn test_progress_deserializes_with_defaults() {
        let progress: UserProgress = serde_json::from_str(r#"{"session_id":"s1"}"#).unwrap();
        assert_eq!(progress, UserProgress::new("s1"));
    }

    #[test]
    fn test_custom_rule_request_is_active() {
        let request: CustomRuleRequest = serde_json::from_str(
            r#"{"name":"n","pattern":"p","check_pattern":"c","correct_pattern":"k"}"#,
        )
        .unwrap();
        let rule = request.into_rule(7);
        assert_eq!(rule.id, 7);
        assert!(rule.is_active);
        assert!(rule.context_rules.is_empty());
    }
}
