//! Error types for nihongo-core.

use thiserror::Error;

/// Errors raised while loading or compiling grammar rules.
///
/// A `RuleError` always describes a single rule (or the rule file as a
/// whole); the checker records it and carries on with the remaining rules.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule file: {0}")]
    InvalidRuleFile(String),

    #[error("invalid {category} rule #{index}: {source}")]
    InvalidRecord {
        category: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid regex in rule {rule}: {source}")]
    InvalidRegex {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty pattern in rule {rule}")]
    EmptyPattern { rule: String },

    #[error("unknown context rule {name} in rule {rule}")]
    UnknownContextRule { rule: String, name: String },

    #[error("unknown condition {name} in rule {rule}")]
    UnknownCondition { rule: String, name: String },
}

impl RuleError {
    /// Name of the rule this error belongs to, if it is tied to one.
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            Self::InvalidRegex { rule, .. }
            | Self::EmptyPattern { rule }
            | Self::UnknownContextRule { rule, .. }
            | Self::UnknownCondition { rule, .. } => Some(rule),
            Self::InvalidRuleFile(_) | Self::InvalidRecord { .. } => None,
        }
    }
}

/// Errors that reject a CSV import as a whole.
///
/// Individual rows that cannot be read are skipped instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors surfaced by an injected item or rule store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap any displayable backend failure.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}
