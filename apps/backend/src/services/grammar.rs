//! Grammar checker construction.

use std::path::Path;

use anyhow::Context;
use nihongo_core::grammar::{GrammarChecker, RuleSet};

/// Rule file shipped with the server.
pub const BUNDLED_RULES: &str = include_str!("../../data/grammar_rules.json");

/// Build a checker from `path`, or from the bundled rules when no path is set.
pub fn load_checker(path: Option<&Path>) -> anyhow::Result<GrammarChecker> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading grammar rules from {}", path.display()))?,
        None => BUNDLED_RULES.to_string(),
    };

    let loaded = RuleSet::from_json(&json).context("parsing grammar rules")?;
    if loaded.rules.is_empty() {
        tracing::warn!("grammar rule file contains no usable rules");
    } else {
        tracing::debug!(records = loaded.rules.len(), "grammar rule file parsed");
    }
    Ok(GrammarChecker::from_loaded(loaded))
}
