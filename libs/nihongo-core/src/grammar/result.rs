//! Analysis output.

use serde::{Deserialize, Serialize};

/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_WIDTH: usize = 10;

/// Match location in characters (not bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One located occurrence of a rule in the analysed text.
///
/// `start`/`end` are byte offsets into the text and are only meaningful
/// during a scan; entries carry the character-based [`Span`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'t> {
    pub text: &'t str,
    pub start: usize,
    pub end: usize,
}

impl<'t> Occurrence<'t> {
    pub fn new(text: &'t str, start: usize, end: usize) -> Self {
        Self { text, start, end }
    }

    /// Everything before the match.
    pub fn before(&self) -> &'t str {
        &self.text[..self.start]
    }

    /// Everything after the match.
    pub fn after(&self) -> &'t str {
        &self.text[self.end..]
    }

    pub fn span(&self) -> Span {
        let start = self.text[..self.start].chars().count();
        let len = self.text[self.start..self.end].chars().count();
        Span {
            start,
            end: start + len,
        }
    }

    /// The match with up to [`CONTEXT_WIDTH`] characters either side,
    /// clipped to the text bounds.
    pub fn context(&self) -> String {
        let from = self.text[..self.start]
            .char_indices()
            .rev()
            .take(CONTEXT_WIDTH)
            .last()
            .map_or(self.start, |(i, _)| i);
        let to = self.text[self.end..]
            .char_indices()
            .nth(CONTEXT_WIDTH)
            .map_or(self.text.len(), |(i, _)| self.end + i);
        self.text[from..to].to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleUsage {
    pub particle: String,
    pub usage: String,
    pub context: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbConjugation {
    pub base_form: String,
    pub conjugation: String,
    pub form: String,
    pub context: String,
    pub span: Span,
}

/// A grammar pattern used correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternUsage {
    pub pattern: String,
    pub explanation: String,
    pub context: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<i64>,
}

/// A grammar pattern used in a context its rule does not allow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub pattern: String,
    pub description: String,
    pub suggestion: String,
    pub example: String,
    pub context: String,
    pub span: Span,
    #[serde(default)]
    pub custom_rule: bool,
}

/// Findings for one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub grammar_issues: Vec<GrammarIssue>,
    pub particle_usage: Vec<ParticleUsage>,
    pub verb_conjugations: Vec<VerbConjugation>,
    pub advanced_patterns: Vec<PatternUsage>,
    pub custom_patterns: Vec<PatternUsage>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.grammar_issues.is_empty()
            && self.particle_usage.is_empty()
            && self.verb_conjugations.is_empty()
            && self.advanced_patterns.is_empty()
            && self.custom_patterns.is_empty()
    }
}
