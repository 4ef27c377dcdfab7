//! Named context predicates.
//!
//! Every predicate looks only at the text on one side of a match: `before`
//! is everything up to the match start, `after` everything from the match end.

use std::fmt;

/// Te-form connective.
pub const TE_FORM_MARKER: char = 'て';

/// Past-tense ending.
pub const PAST_TENSE_MARKER: char = 'た';

/// Plain i-adjective ending.
pub const ADJECTIVE_ENDING: char = 'い';

/// Characters that close a sentence.
pub const SENTENCE_TERMINATORS: &[char] = &['。', '.', '\n'];

/// Conjunctions that introduce a contrasting clause.
pub const CONTRAST_MARKERS: &[&str] = &["が", "けど", "けれど", "しかし", "でも"];

/// Clause separators for conditional main clauses.
pub const CLAUSE_SEPARATORS: &[char] = &['、', ','];

/// Constraint on the text around a pattern or custom-rule match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRule {
    MustFollowTeForm,
    EndOfSentence,
    MustFollowVerbOrAdjective,
    RequiresContrastingClause,
}

impl ContextRule {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "must_follow_te_form" => Some(Self::MustFollowTeForm),
            "end_of_sentence" => Some(Self::EndOfSentence),
            "must_follow_verb_or_adjective" => Some(Self::MustFollowVerbOrAdjective),
            "requires_contrasting_clause" => Some(Self::RequiresContrastingClause),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MustFollowTeForm => "must_follow_te_form",
            Self::EndOfSentence => "end_of_sentence",
            Self::MustFollowVerbOrAdjective => "must_follow_verb_or_adjective",
            Self::RequiresContrastingClause => "requires_contrasting_clause",
        }
    }

    pub fn holds(&self, before: &str, after: &str) -> bool {
        match self {
            Self::MustFollowTeForm => before.trim().ends_with(TE_FORM_MARKER),
            Self::EndOfSentence => after.trim().contains(SENTENCE_TERMINATORS),
            Self::MustFollowVerbOrAdjective => before.trim().ends_with(ADJECTIVE_ENDING),
            Self::RequiresContrastingClause => {
                CONTRAST_MARKERS.iter().any(|marker| after.contains(marker))
            }
        }
    }
}

impl fmt::Display for ContextRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-circuits on the first failing rule.
pub fn all_hold(rules: &[ContextRule], before: &str, after: &str) -> bool {
    rules.iter().all(|rule| rule.holds(before, after))
}

/// Condition on the text before a conditional form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecedingCondition {
    VerbPastForm,
}

impl PrecedingCondition {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "verb_past_form" => Some(Self::VerbPastForm),
            _ => None,
        }
    }

    pub fn holds(&self, before: &str) -> bool {
        match self {
            Self::VerbPastForm => before.trim().ends_with(PAST_TENSE_MARKER),
        }
    }
}

/// Condition on the text after a conditional form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowingCondition {
    MainClauseRequired,
}

impl FollowingCondition {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "main_clause_required" => Some(Self::MainClauseRequired),
            _ => None,
        }
    }

    pub fn holds(&self, after: &str) -> bool {
        match self {
            // A separator followed by at least one more character.
            Self::MainClauseRequired => after.char_indices().any(|(i, c)| {
                CLAUSE_SEPARATORS.contains(&c) && !after[i + c.len_utf8()..].is_empty()
            }),
        }
    }
}
