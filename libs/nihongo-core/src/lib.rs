//! Core library for the Japanese study companion.
//!
//! Provides:
//! - Rule-based grammar checker with reloadable user-defined rules
//! - SM-2 spaced repetition scheduling over per-session item collections
//! - Bulk-entry line and CSV parsers for study items
//! - Shared types (SrsItem, ItemType, ReviewRecord, etc.)

pub mod algorithm;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod srs;
pub mod types;

pub use algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{ImportError, RuleError, StoreError};
pub use grammar::{AnalysisResult, CustomRule, CustomRuleSource, GrammarChecker, RuleSet};
pub use parser::{parse_bulk, parse_csv};
pub use srs::{Collection, DayCount, DueFilter, ItemStore, MemoryStore, SpacedRepetitionSystem, Statistics};
pub use types::{
    ImportRecord, ItemType, ItemUpdate, NewItem, ReviewRecord, SrsItem, INITIAL_EASE,
    MINIMUM_EASE,
};
