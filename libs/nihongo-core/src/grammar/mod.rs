//! Rule-based grammar checking.
//!
//! Rules come from a JSON rule file ([`RuleSet::from_json`]) plus a
//! reloadable list of user-defined rules ([`CustomRuleSource`]). A scan is a
//! pure function of the text and the compiled rules.

pub mod checker;
pub mod compiled;
pub mod context;
pub mod result;
pub mod rules;

pub use checker::{validate_custom_rule, CustomRuleSource, GrammarChecker};
pub use context::ContextRule;
pub use result::{
    AnalysisResult, GrammarIssue, ParticleUsage, PatternUsage, Span, VerbConjugation,
};
pub use rules::{
    ConditionSet, ConditionalExample, ConditionalRule, CustomRule, LoadedRules, ParticleRule,
    PatternRule, Rule, RuleSet, VerbRule,
};
