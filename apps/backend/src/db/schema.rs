//! SQLite schema definitions.

/// Complete schema for the companion database.
pub const SCHEMA: &str = r#"
-- Study items, one JSON collection per session
CREATE TABLE IF NOT EXISTS srs_collections (
    session_id TEXT PRIMARY KEY,
    items TEXT NOT NULL DEFAULT '{}',
    updated_at TEXT NOT NULL
);

-- User-defined grammar rules (soft deleted via is_active)
CREATE TABLE IF NOT EXISTS custom_grammar_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    pattern TEXT NOT NULL,
    check_pattern TEXT NOT NULL,
    correct_pattern TEXT NOT NULL,
    explanation TEXT NOT NULL DEFAULT '',
    example TEXT NOT NULL DEFAULT '',
    error_description TEXT NOT NULL DEFAULT '',
    suggestion TEXT NOT NULL DEFAULT '',
    context_rules TEXT NOT NULL DEFAULT '[]',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

-- Cumulative progress per session
CREATE TABLE IF NOT EXISTS user_progress (
    session_id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);

-- Grammar check history
CREATE TABLE IF NOT EXISTS grammar_checks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    input_text TEXT NOT NULL,
    results TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_custom_rules_active ON custom_grammar_rules(is_active);
CREATE INDEX IF NOT EXISTS idx_grammar_checks_session ON grammar_checks(session_id, id);
"#;
