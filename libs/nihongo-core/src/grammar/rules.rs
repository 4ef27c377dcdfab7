//! Rule records and rule-file loading.
//!
//! A rule file is a JSON object with the optional keys `particles`, `verbs`,
//! `common_patterns` and `conditional_patterns`, each a list of records.
//! Records are decoded one at a time so a single malformed record is reported
//! and skipped without losing the rest of the file.

use crate::error::RuleError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Particle lookup rule. Every hit is reported as a usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRule {
    /// Regex locating the particle.
    pub pattern: String,
    pub particle: String,
    #[serde(default)]
    pub usage: String,
}

/// Verb conjugation lookup rule. Every hit is reported as a usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbRule {
    /// Regex locating the conjugated form.
    pub pattern: String,
    pub base_form: String,
    pub conjugation: String,
    pub form: String,
}

/// Grammar pattern validated against its context rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Display name of the grammatical form.
    pub pattern: String,
    pub check_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_pattern: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub context_rules: Vec<String>,
}

/// Preceding/following constraints of a conditional rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    #[serde(default)]
    pub preceding: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
}

/// One literal form a conditional rule looks for, with its corrected usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExample {
    /// Literal text, not a regex.
    pub pattern: String,
    #[serde(default)]
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorrect: Option<String>,
}

/// Conditional construction (e.g. 〜たら) with structured conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub pattern: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub conditions: ConditionSet,
    #[serde(default)]
    pub examples: Vec<ConditionalExample>,
}

/// User-defined rule, loaded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    pub id: i64,
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
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A rule of any category.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Particle(ParticleRule),
    Verb(VerbRule),
    Pattern(PatternRule),
    Conditional(ConditionalRule),
    Custom(CustomRule),
}

impl Rule {
    /// Human readable name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Particle(r) => &r.particle,
            Self::Verb(r) => &r.conjugation,
            Self::Pattern(r) => &r.pattern,
            Self::Conditional(r) => &r.pattern,
            Self::Custom(r) => &r.name,
        }
    }
}

/// The built-in rule categories, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub particles: Vec<ParticleRule>,
    pub verbs: Vec<VerbRule>,
    pub common_patterns: Vec<PatternRule>,
    pub conditional_patterns: Vec<ConditionalRule>,
}

/// A rule set plus the records that could not be decoded.
#[derive(Debug, Default)]
pub struct LoadedRules {
    pub rules: RuleSet,
    pub rejected: Vec<RuleError>,
}

impl RuleSet {
    /// Parse a rule file. Missing categories load as empty lists.
    pub fn from_json(json: &str) -> Result<LoadedRules, RuleError> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| RuleError::InvalidRuleFile(e.to_string()))?;
        let Value::Object(root) = root else {
            return Err(RuleError::InvalidRuleFile(
                "expected a JSON object at the top level".to_string(),
            ));
        };

        let mut rejected = Vec::new();
        let rules = RuleSet {
            particles: decode_category(&root, "particles", &mut rejected),
            verbs: decode_category(&root, "verbs", &mut rejected),
            common_patterns: decode_category(&root, "common_patterns", &mut rejected),
            conditional_patterns: decode_category(&root, "conditional_patterns", &mut rejected),
        };

        Ok(LoadedRules { rules, rejected })
    }

    /// Flatten into rules in fixed category order, keeping input order
    /// within each category.
    pub fn into_rules(self) -> Vec<Rule> {
        let particles = self.particles.into_iter().map(Rule::Particle);
        let verbs = self.verbs.into_iter().map(Rule::Verb);
        let patterns = self.common_patterns.into_iter().map(Rule::Pattern);
        let conditionals = self.conditional_patterns.into_iter().map(Rule::Conditional);

        particles
            .chain(verbs)
            .chain(patterns)
            .chain(conditionals)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
            + self.verbs.len()
            + self.common_patterns.len()
            + self.conditional_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn decode_category<T: DeserializeOwned>(
    root: &Map<String, Value>,
    category: &'static str,
    rejected: &mut Vec<RuleError>,
) -> Vec<T> {
    let records = match root.get(category) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(records)) => records,
        Some(other) => {
            // Not a list: treat the whole category as one bad record.
            let source = <serde_json::Error as serde::de::Error>::custom(format!(
                "expected a list, found {other}"
            ));
            rejected.push(RuleError::InvalidRecord {
                category,
                index: 0,
                source,
            });
            return Vec::new();
        }
    };

    let mut decoded = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match serde_json::from_value(record.clone()) {
            Ok(rule) => decoded.push(rule),
            Err(source) => {
                tracing::warn!(category, index, error = %source, "skipping malformed rule record");
                rejected.push(RuleError::InvalidRecord {
                    category,
                    index,
                    source,
                });
            }
        }
    }
    decoded
}
