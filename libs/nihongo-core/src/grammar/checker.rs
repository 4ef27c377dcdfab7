//! The grammar checker: compiled built-in rules plus reloadable custom rules.

use super::compiled::CompiledRule;
use super::result::AnalysisResult;
use super::rules::{CustomRule, LoadedRules, Rule, RuleSet};
use crate::error::{RuleError, StoreError};

/// Supplies the currently active custom rules.
pub trait CustomRuleSource {
    fn active_rules(&self) -> Result<Vec<CustomRule>, StoreError>;
}

impl CustomRuleSource for Vec<CustomRule> {
    fn active_rules(&self) -> Result<Vec<CustomRule>, StoreError> {
        Ok(self.iter().filter(|r| r.is_active).cloned().collect())
    }
}

impl<S: CustomRuleSource + ?Sized> CustomRuleSource for &S {
    fn active_rules(&self) -> Result<Vec<CustomRule>, StoreError> {
        (**self).active_rules()
    }
}

/// Rule-based grammar checker.
///
/// Built-in rules are evaluated in category order (particles, verbs,
/// context-aware patterns, conditionals), custom rules last. Rules that fail
/// to compile are kept aside in [`GrammarChecker::rejected_rules`] and never
/// affect the others.
#[derive(Debug, Default)]
pub struct GrammarChecker {
    rules: Vec<CompiledRule>,
    custom: Vec<CompiledRule>,
    rejected: Vec<RuleError>,
    rejected_custom: Vec<RuleError>,
}

impl GrammarChecker {
    /// Compile a rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self::from_loaded(LoadedRules {
            rules,
            rejected: Vec::new(),
        })
    }

    /// Compile a loaded rule file, keeping its record-level rejections.
    pub fn from_loaded(loaded: LoadedRules) -> Self {
        let (rules, mut rejected) = compile_all(loaded.rules.into_rules());
        let mut all_rejected = loaded.rejected;
        all_rejected.append(&mut rejected);

        tracing::info!(
            compiled = rules.len(),
            rejected = all_rejected.len(),
            "grammar rules loaded"
        );

        Self {
            rules,
            custom: Vec::new(),
            rejected: all_rejected,
            rejected_custom: Vec::new(),
        }
    }

    /// Re-fetch the active custom rules and replace the current ones.
    ///
    /// When the source fails the previous custom rules stay in place.
    /// Returns the number of custom rules now active.
    pub fn reload_custom_rules<S>(&mut self, source: &S) -> Result<usize, StoreError>
    where
        S: CustomRuleSource + ?Sized,
    {
        let fetched = source.active_rules()?;
        let (custom, rejected) = compile_all(
            fetched
                .into_iter()
                .filter(|r| r.is_active)
                .map(Rule::Custom)
                .collect(),
        );

        tracing::debug!(
            active = custom.len(),
            rejected = rejected.len(),
            "custom grammar rules reloaded"
        );

        self.custom = custom;
        self.rejected_custom = rejected;
        Ok(self.custom.len())
    }

    /// Analyse `text` against every compiled rule.
    pub fn check_grammar(&self, text: &str) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        for rule in self.rules.iter().chain(&self.custom) {
            rule.evaluate(text, &mut result);
        }
        result
    }

    /// Rules excluded because they could not be loaded or compiled.
    pub fn rejected_rules(&self) -> impl Iterator<Item = &RuleError> {
        self.rejected.iter().chain(&self.rejected_custom)
    }

    /// Number of compiled built-in rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Custom rules currently in effect.
    pub fn custom_rules(&self) -> impl Iterator<Item = &CustomRule> {
        self.custom.iter().filter_map(|rule| match rule {
            CompiledRule::Custom(c) => Some(c.rule()),
            _ => None,
        })
    }
}

fn compile_all(rules: Vec<Rule>) -> (Vec<CompiledRule>, Vec<RuleError>) {
    let mut compiled = Vec::with_capacity(rules.len());
    let mut rejected = Vec::new();

    for rule in rules {
        // Patterns without context rules are never evaluated.
        if let Rule::Pattern(pattern) = &rule {
            if pattern.context_rules.is_empty() {
                tracing::debug!(rule = %pattern.pattern, "skipping unconstrained pattern");
                continue;
            }
        }

        match CompiledRule::compile(rule) {
            Ok(rule) => compiled.push(rule),
            Err(err) => {
                tracing::warn!(error = %err, "skipping grammar rule");
                rejected.push(err);
            }
        }
    }

    (compiled, rejected)
}

/// Validate a single custom rule without installing it.
pub fn validate_custom_rule(rule: &CustomRule) -> Result<(), RuleError> {
    CompiledRule::compile(Rule::Custom(rule.clone())).map(|_| ())
}
