//! Rule compilation and per-category evaluation.
//!
//! Compiling turns a [`Rule`] into a [`CompiledRule`]: regexes are built once
//! and context/condition names are resolved. Any failure is returned as a
//! [`RuleError`] for that rule alone.

use super::context::{all_hold, ContextRule, FollowingCondition, PrecedingCondition};
use super::result::{
    AnalysisResult, GrammarIssue, Occurrence, ParticleUsage, PatternUsage, VerbConjugation,
};
use super::rules::{ConditionalRule, CustomRule, ParticleRule, PatternRule, Rule, VerbRule};
use crate::error::RuleError;
use regex::Regex;

/// A rule ready to be evaluated against text.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    Particle(CompiledParticle),
    Verb(CompiledVerb),
    Pattern(CompiledPattern),
    Conditional(CompiledConditional),
    Custom(CompiledCustom),
}

#[derive(Debug, Clone)]
pub struct CompiledParticle {
    rule: ParticleRule,
    regex: Regex,
}

#[derive(Debug, Clone)]
pub struct CompiledVerb {
    rule: VerbRule,
    regex: Regex,
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    rule: PatternRule,
    regex: Regex,
    context_rules: Vec<ContextRule>,
}

#[derive(Debug, Clone)]
pub struct CompiledConditional {
    rule: ConditionalRule,
    preceding: Vec<PrecedingCondition>,
    following: Vec<FollowingCondition>,
}

#[derive(Debug, Clone)]
pub struct CompiledCustom {
    rule: CustomRule,
    check: Regex,
    correct: Regex,
    context_rules: Vec<ContextRule>,
}

impl CompiledRule {
    pub fn compile(rule: Rule) -> Result<Self, RuleError> {
        match rule {
            Rule::Particle(rule) => {
                let regex = compile_regex(&rule.particle, &rule.pattern)?;
                Ok(Self::Particle(CompiledParticle { rule, regex }))
            }
            Rule::Verb(rule) => {
                let regex = compile_regex(&rule.conjugation, &rule.pattern)?;
                Ok(Self::Verb(CompiledVerb { rule, regex }))
            }
            Rule::Pattern(rule) => {
                let regex = compile_regex(&rule.pattern, &rule.check_pattern)?;
                let context_rules = resolve_context_rules(&rule.pattern, &rule.context_rules)?;
                Ok(Self::Pattern(CompiledPattern {
                    rule,
                    regex,
                    context_rules,
                }))
            }
            Rule::Conditional(rule) => {
                if rule.examples.iter().any(|e| e.pattern.is_empty()) {
                    return Err(RuleError::EmptyPattern { rule: rule.pattern });
                }
                let preceding = resolve_conditions(
                    &rule.pattern,
                    &rule.conditions.preceding,
                    PrecedingCondition::from_name,
                )?;
                let following = resolve_conditions(
                    &rule.pattern,
                    &rule.conditions.following,
                    FollowingCondition::from_name,
                )?;
                Ok(Self::Conditional(CompiledConditional {
                    rule,
                    preceding,
                    following,
                }))
            }
            Rule::Custom(rule) => {
                let check = compile_regex(&rule.name, &rule.check_pattern)?;
                let correct = compile_regex(&rule.name, &rule.correct_pattern)?;
                let context_rules = resolve_context_rules(&rule.name, &rule.context_rules)?;
                Ok(Self::Custom(CompiledCustom {
                    rule,
                    check,
                    correct,
                    context_rules,
                }))
            }
        }
    }

    /// Append this rule's findings for `text` to `result`.
    pub fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        match self {
            Self::Particle(p) => p.evaluate(text, result),
            Self::Verb(v) => v.evaluate(text, result),
            Self::Pattern(p) => p.evaluate(text, result),
            Self::Conditional(c) => c.evaluate(text, result),
            Self::Custom(c) => c.evaluate(text, result),
        }
    }
}

impl CompiledParticle {
    fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        for occ in occurrences(&self.regex, text) {
            result.particle_usage.push(ParticleUsage {
                particle: self.rule.particle.clone(),
                usage: self.rule.usage.clone(),
                context: occ.context(),
                span: occ.span(),
            });
        }
    }
}

impl CompiledVerb {
    fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        for occ in occurrences(&self.regex, text) {
            result.verb_conjugations.push(VerbConjugation {
                base_form: self.rule.base_form.clone(),
                conjugation: self.rule.conjugation.clone(),
                form: self.rule.form.clone(),
                context: occ.context(),
                span: occ.span(),
            });
        }
    }
}

impl CompiledPattern {
    fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        // Only rules that declare constraints take part in this stage.
        if self.context_rules.is_empty() {
            return;
        }

        for occ in occurrences(&self.regex, text) {
            if all_hold(&self.context_rules, occ.before(), occ.after()) {
                result.advanced_patterns.push(PatternUsage {
                    pattern: self.rule.pattern.clone(),
                    explanation: self.rule.explanation.clone(),
                    context: occ.context(),
                    span: occ.span(),
                    rule_id: None,
                });
            } else {
                result.grammar_issues.push(GrammarIssue {
                    pattern: self.rule.pattern.clone(),
                    description: self.rule.error_description.clone(),
                    suggestion: self.rule.suggestion.clone(),
                    example: self.rule.example.clone(),
                    context: occ.context(),
                    span: occ.span(),
                    custom_rule: false,
                });
            }
        }
    }
}

impl CompiledConditional {
    fn holds(&self, occ: &Occurrence<'_>) -> bool {
        let before = occ.before();
        let after = occ.after();
        self.preceding.iter().all(|c| c.holds(before))
            && self.following.iter().all(|c| c.holds(after))
    }

    /// Only failures are reported; a satisfied conditional adds nothing.
    fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        for example in &self.rule.examples {
            for (start, literal) in text.match_indices(example.pattern.as_str()) {
                let occ = Occurrence::new(text, start, start + literal.len());
                if self.holds(&occ) {
                    continue;
                }
                let description = if self.rule.error_description.is_empty() {
                    self.rule.explanation.clone()
                } else {
                    self.rule.error_description.clone()
                };
                result.grammar_issues.push(GrammarIssue {
                    pattern: self.rule.pattern.clone(),
                    description,
                    suggestion: self.rule.suggestion.clone(),
                    example: example.correct.clone(),
                    context: occ.context(),
                    span: occ.span(),
                    custom_rule: false,
                });
            }
        }
    }
}

impl CompiledCustom {
    pub fn rule(&self) -> &CustomRule {
        &self.rule
    }

    fn evaluate(&self, text: &str, result: &mut AnalysisResult) {
        let hits: Vec<Occurrence<'_>> = occurrences(&self.check, text).collect();
        if hits.is_empty() {
            return;
        }

        // Whole-text check, independent of where the hit is.
        let correct_somewhere = self.correct.is_match(text);

        for occ in hits {
            let context_ok = all_hold(&self.context_rules, occ.before(), occ.after());
            if context_ok && correct_somewhere {
                result.custom_patterns.push(PatternUsage {
                    pattern: self.rule.pattern.clone(),
                    explanation: self.rule.explanation.clone(),
                    context: occ.context(),
                    span: occ.span(),
                    rule_id: Some(self.rule.id),
                });
            } else {
                result.grammar_issues.push(GrammarIssue {
                    pattern: self.rule.pattern.clone(),
                    description: self.rule.error_description.clone(),
                    suggestion: self.rule.suggestion.clone(),
                    example: self.rule.example.clone(),
                    context: occ.context(),
                    span: occ.span(),
                    custom_rule: true,
                });
            }
        }
    }
}

fn occurrences<'a>(regex: &'a Regex, text: &'a str) -> impl Iterator<Item = Occurrence<'a>> + 'a {
    regex
        .find_iter(text)
        .map(move |m| Occurrence::new(text, m.start(), m.end()))
}

fn compile_regex(rule: &str, pattern: &str) -> Result<Regex, RuleError> {
    if pattern.is_empty() {
        return Err(RuleError::EmptyPattern {
            rule: rule.to_string(),
        });
    }
    Regex::new(pattern).map_err(|source| RuleError::InvalidRegex {
        rule: rule.to_string(),
        source,
    })
}

fn resolve_context_rules(rule: &str, names: &[String]) -> Result<Vec<ContextRule>, RuleError> {
    names
        .iter()
        .map(|name| {
            ContextRule::from_name(name).ok_or_else(|| RuleError::UnknownContextRule {
                rule: rule.to_string(),
                name: name.clone(),
            })
        })
        .collect()
}

fn resolve_conditions<C>(
    rule: &str,
    names: &[String],
    parse: fn(&str) -> Option<C>,
) -> Result<Vec<C>, RuleError> {
    names
        .iter()
        .map(|name| {
            parse(name).ok_or_else(|| RuleError::UnknownCondition {
                rule: rule.to_string(),
                name: name.clone(),
            })
        })
        .collect()
}
