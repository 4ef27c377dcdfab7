//! Repository pattern for database access.

use crate::db::error::DbError;
use crate::models::{GrammarCheck, UserProgress};
use chrono::{DateTime, Utc};
use nihongo_core::grammar::{AnalysisResult, CustomRule, CustomRuleSource};
use nihongo_core::srs::{store, Collection, ItemStore};
use nihongo_core::StoreError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for user-defined grammar rules.
pub trait CustomRuleRepository {
    /// Active rules, oldest first.
    fn list_custom_rules(&self) -> Result<Vec<CustomRule>>;
    fn get_custom_rule(&self, id: i64) -> Result<Option<CustomRule>>;
    /// Insert a rule; its `id` is ignored and the stored rule is returned.
    fn create_custom_rule(&self, rule: &CustomRule) -> Result<CustomRule>;
    /// Replace an active rule. Returns `None` when no active rule has that id.
    fn update_custom_rule(&self, rule: &CustomRule) -> Result<Option<CustomRule>>;
    /// Soft delete. Returns `false` when no active rule has that id.
    fn deactivate_custom_rule(&self, id: i64) -> Result<bool>;
}

/// Repository for cumulative progress.
pub trait ProgressRepository {
    fn get_progress(&self, session_id: &str) -> Result<Option<UserProgress>>;
    fn save_progress(&self, progress: &UserProgress) -> Result<()>;
}

/// Repository for grammar check history.
pub trait CheckRepository {
    fn insert_check(
        &self,
        session_id: &str,
        input_text: &str,
        results: &AnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Result<i64>;
    /// Most recent checks first.
    fn recent_checks(&self, session_id: Option<&str>, limit: usize) -> Result<Vec<GrammarCheck>>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        Ok(())
    }

    fn collection_json(&self, session_id: &str) -> Result<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT items FROM srs_collections WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }

    fn put_collection_json(&self, session_id: &str, json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO srs_collections (session_id, items, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id) DO UPDATE SET items = excluded.items, updated_at = excluded.updated_at",
            params![session_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

const RULE_COLUMNS: &str = "id, name, pattern, check_pattern, correct_pattern, explanation, example, error_description, suggestion, context_rules, is_active";

/// Raw rule row; `context_rules` is still JSON text.
struct RuleRow {
    rule: CustomRule,
    context_rules: String,
}

impl RuleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            rule: CustomRule {
                id: row.get(0)?,
                name: row.get(1)?,
                pattern: row.get(2)?,
                check_pattern: row.get(3)?,
                correct_pattern: row.get(4)?,
                explanation: row.get(5)?,
                example: row.get(6)?,
                error_description: row.get(7)?,
                suggestion: row.get(8)?,
                context_rules: Vec::new(),
                is_active: row.get(10)?,
            },
            context_rules: row.get(9)?,
        })
    }

    fn into_rule(self) -> Result<CustomRule> {
        let mut rule = self.rule;
        rule.context_rules = serde_json::from_str(&self.context_rules)?;
        Ok(rule)
    }
}

impl CustomRuleRepository for SqliteRepository {
    fn list_custom_rules(&self) -> Result<Vec<CustomRule>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM custom_grammar_rules WHERE is_active = 1 ORDER BY id"
        ))?;

        let rows = stmt
            .query_map([], RuleRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RuleRow::into_rule).collect()
    }

    fn get_custom_rule(&self, id: i64) -> Result<Option<CustomRule>> {
        self.conn
            .query_row(
                &format!("SELECT {RULE_COLUMNS} FROM custom_grammar_rules WHERE id = ?1"),
                params![id],
                RuleRow::from_row,
            )
            .optional()?
            .map(RuleRow::into_rule)
            .transpose()
    }

    fn create_custom_rule(&self, rule: &CustomRule) -> Result<CustomRule> {
        self.conn.execute(
            "INSERT INTO custom_grammar_rules (name, pattern, check_pattern, correct_pattern, explanation, example, error_description, suggestion, context_rules, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)",
            params![
                rule.name,
                rule.pattern,
                rule.check_pattern,
                rule.correct_pattern,
                rule.explanation,
                rule.example,
                rule.error_description,
                rule.suggestion,
                serde_json::to_string(&rule.context_rules)?,
                Utc::now().to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %rule.name, "custom rule created");

        Ok(CustomRule {
            id,
            is_active: true,
            ..rule.clone()
        })
    }

    fn update_custom_rule(&self, rule: &CustomRule) -> Result<Option<CustomRule>> {
        let changed = self.conn.execute(
            "UPDATE custom_grammar_rules SET name = ?2, pattern = ?3, check_pattern = ?4, correct_pattern = ?5, explanation = ?6, example = ?7, error_description = ?8, suggestion = ?9, context_rules = ?10
             WHERE id = ?1 AND is_active = 1",
            params![
                rule.id,
                rule.name,
                rule.pattern,
                rule.check_pattern,
                rule.correct_pattern,
                rule.explanation,
                rule.example,
                rule.error_description,
                rule.suggestion,
                serde_json::to_string(&rule.context_rules)?,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_custom_rule(rule.id)
    }

    fn deactivate_custom_rule(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE custom_grammar_rules SET is_active = 0 WHERE id = ?1 AND is_active = 1",
            params![id],
        )?;
        Ok(changed > 0)
    }
}

impl ProgressRepository for SqliteRepository {
    fn get_progress(&self, session_id: &str) -> Result<Option<UserProgress>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM user_progress WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_progress (session_id, data) VALUES (?1, ?2)
             ON CONFLICT(session_id) DO UPDATE SET data = excluded.data",
            params![progress.session_id, serde_json::to_string(progress)?],
        )?;
        Ok(())
    }
}

impl CheckRepository for SqliteRepository {
    fn insert_check(
        &self,
        session_id: &str,
        input_text: &str,
        results: &AnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO grammar_checks (session_id, input_text, results, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session_id,
                input_text,
                serde_json::to_string(results)?,
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_checks(&self, session_id: Option<&str>, limit: usize) -> Result<Vec<GrammarCheck>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, input_text, results, created_at FROM grammar_checks
             WHERE ?1 IS NULL OR session_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![session_id, limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, session_id, input_text, results, created_at)| {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| DbError::InvalidData(format!("check {id} created_at: {e}")))?
                    .with_timezone(&Utc);
                Ok(GrammarCheck {
                    id,
                    session_id,
                    input_text,
                    results: serde_json::from_str(&results)?,
                    created_at,
                })
            })
            .collect()
    }
}

impl ItemStore for SqliteRepository {
    fn load(&self, session_id: &str) -> std::result::Result<Collection, StoreError> {
        match self.collection_json(session_id)? {
            Some(json) => store::from_json(&json),
            None => Ok(Collection::new()),
        }
    }

    fn save(&self, session_id: &str, items: &Collection) -> std::result::Result<(), StoreError> {
        let json = store::to_json(items)?;
        Ok(self.put_collection_json(session_id, &json)?)
    }
}

impl CustomRuleSource for SqliteRepository {
    fn active_rules(&self) -> std::result::Result<Vec<CustomRule>, StoreError> {
        self.list_custom_rules().map_err(Into::into)
    }
}
